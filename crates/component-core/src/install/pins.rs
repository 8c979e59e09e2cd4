//! Script packages pinned to a CDN build instead of the standard installer
//!
//! `bin/importmap pin` downloads an unusable artifact for these packages, so
//! their pins are written directly into `config/importmap.rb`.

/// One `pin "<name>", to: "<url>"` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinDeclaration {
    pub name: &'static str,
    pub url: &'static str,
}

impl PinDeclaration {
    pub fn to_line(&self) -> String {
        format!("pin \"{}\", to: \"{}\"", self.name, self.url)
    }
}

/// A script package and the pins that replace its standard installation
#[derive(Debug, Clone, Copy)]
pub struct CdnPin {
    pub package: &'static str,
    pub pins: &'static [PinDeclaration],
}

pub const CDN_PINS: &[CdnPin] = &[
    CdnPin {
        package: "motion",
        pins: &[PinDeclaration {
            name: "motion",
            url: "https://cdn.jsdelivr.net/npm/motion@11.11.17/+esm",
        }],
    },
    CdnPin {
        package: "tippy.js",
        pins: &[
            PinDeclaration {
                name: "tippy.js",
                url: "https://cdn.jsdelivr.net/npm/tippy.js@6.3.7/+esm",
            },
            PinDeclaration {
                name: "@popperjs/core",
                url: "https://cdn.jsdelivr.net/npm/@popperjs/core@2.11.8/+esm",
            },
        ],
    },
];

/// Pins to write instead of installing `package`, if it is special-cased
pub fn cdn_pins(package: &str) -> Option<&'static [PinDeclaration]> {
    CDN_PINS
        .iter()
        .find(|entry| entry.package == package)
        .map(|entry| entry.pins)
}
