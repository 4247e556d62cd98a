//! Static catalog of diagnostic commands.
//!
//! Pure data: an ordered label → command-line mapping consumed by the runner.
//! The command strings are passed to the OS shell verbatim.

use crate::model::CommandSpec;

pub struct CommandCatalog {
    entries: Vec<CommandSpec>,
}

impl CommandCatalog {
    /// The built-in set of network diagnostics, in display order.
    pub fn builtin() -> Self {
        let entries = [
            ("View basic network configuration", "ipconfig"),
            ("View detailed network configuration", "ipconfig /all"),
            ("Flush DNS resolver cache", "ipconfig /flushdns"),
            ("Check connectivity to Google", "ping google.com"),
            ("Trace route to Google", "tracert google.com"),
            ("Perform DNS lookup for Google", "nslookup google.com"),
            ("Display active network connections", "netstat -a"),
            ("View ARP cache", "arp -a"),
            ("Show routing table", "route print"),
            ("View MAC address of your device", "getmac"),
            ("Get device hostname", "hostname"),
            ("Display active TCP connections and ports", "netstat -n"),
            ("List all listening ports", "netstat -an"),
            ("Show wireless network profiles", "netsh wlan show profiles"),
            (
                "Display Wi-Fi passwords (admin required)",
                "netsh wlan show profile name=WiFi-Name key=clear",
            ),
            ("Test network speed to a server", "ping 8.8.8.8"),
        ]
        .into_iter()
        .map(|(label, command_line)| CommandSpec::new(label, command_line))
        .collect();
        Self { entries }
    }

    pub fn get(&self, label: &str) -> Option<&CommandSpec> {
        self.entries.iter().find(|spec| spec.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_preserves_display_order() {
        let catalog = CommandCatalog::builtin();
        assert_eq!(catalog.len(), 16);
        let labels: Vec<&str> = catalog.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels[0], "View basic network configuration");
        assert_eq!(labels[3], "Check connectivity to Google");
        assert_eq!(labels[15], "Test network speed to a server");
    }

    #[test]
    fn lookup_by_label() {
        let catalog = CommandCatalog::builtin();
        let spec = catalog.get("Trace route to Google").expect("known label");
        assert_eq!(spec.command_line, "tracert google.com");
        assert!(catalog.get("No such diagnostic").is_none());
    }

    #[test]
    fn every_command_line_is_non_empty() {
        let catalog = CommandCatalog::builtin();
        assert!(!catalog.is_empty());
        for spec in catalog.iter() {
            assert!(!spec.command_line.trim().is_empty(), "{}", spec.label);
        }
    }
}
