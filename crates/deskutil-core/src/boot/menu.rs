use std::fmt::Write as FmtWrite;

/// Boot files and options for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub generation: u64,
    pub loader: String,
    pub initrd: String,
    pub options: String,
}

/// Kernel command line: init path, the generation's own parameters, then the
/// forced options. Empty parts are dropped.
pub fn kernel_options(init: &str, params: &str, forced: &str) -> String {
    [format!("init={}", init).as_str(), params, forced]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a `menuentry` booting the first entry, with one submenu entry per
/// generation.
pub fn render_menu(title: &str, icon: &str, entries: &[MenuEntry]) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "menuentry \"{}\" {{", title);
    let _ = writeln!(out, "    icon {}", icon);

    if let Some(newest) = entries.first() {
        let _ = writeln!(out, "    loader {}", newest.loader);
        let _ = writeln!(out, "    initrd {}", newest.initrd);
        let _ = writeln!(out, "    options \"{}\"", newest.options);
    }

    for entry in entries {
        let _ = writeln!(out, "    submenuentry \"Generation {}\" {{", entry.generation);
        let _ = writeln!(out, "        loader {}", entry.loader);
        let _ = writeln!(out, "        initrd {}", entry.initrd);
        let _ = writeln!(out, "        options \"{}\"", entry.options);
        let _ = writeln!(out, "    }}");
    }

    let _ = writeln!(out, "}}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(generation: u64) -> MenuEntry {
        MenuEntry {
            generation,
            loader: format!("/EFI/nixos/k{}-bzImage.efi", generation),
            initrd: format!("/EFI/nixos/i{}-initrd.efi", generation),
            options: format!("init=/g{}/init quiet", generation),
        }
    }

    #[test]
    fn test_kernel_options() {
        assert_eq!(
            kernel_options("/nix/store/x/init", "loglevel=4 ", "splash"),
            "init=/nix/store/x/init loglevel=4 splash"
        );
        assert_eq!(kernel_options("/g/init", "", "splash"), "init=/g/init splash");
    }

    #[test]
    fn test_render_menu() {
        let menu = render_menu("ZenOS", "/icon.png", &[entry(12), entry(11)]);
        assert_eq!(
            menu,
            "menuentry \"ZenOS\" {\n\
             \x20   icon /icon.png\n\
             \x20   loader /EFI/nixos/k12-bzImage.efi\n\
             \x20   initrd /EFI/nixos/i12-initrd.efi\n\
             \x20   options \"init=/g12/init quiet\"\n\
             \x20   submenuentry \"Generation 12\" {\n\
             \x20       loader /EFI/nixos/k12-bzImage.efi\n\
             \x20       initrd /EFI/nixos/i12-initrd.efi\n\
             \x20       options \"init=/g12/init quiet\"\n\
             \x20   }\n\
             \x20   submenuentry \"Generation 11\" {\n\
             \x20       loader /EFI/nixos/k11-bzImage.efi\n\
             \x20       initrd /EFI/nixos/i11-initrd.efi\n\
             \x20       options \"init=/g11/init quiet\"\n\
             \x20   }\n\
             }\n"
        );
    }
}
