//! Position markers drawn over the gene track.

use serde::Serialize;

/// Icons handed out to successive pin groups.
pub const PIN_ICONS: [&str; 6] = [
    "lib/pins/pin_red.png",
    "lib/pins/pin_blue.png",
    "lib/pins/pin_green.png",
    "lib/pins/pin_yellow.png",
    "lib/pins/pin_magenta.png",
    "lib/pins/pin_gray.png",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    pub pos: u64,
    pub icon: String,
}

/// Pins plus a rotating icon palette.
#[derive(Debug, Clone, Default)]
pub struct Pins {
    pins: Vec<Pin>,
    next_icon: usize,
}

impl Pins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group of pins sharing one icon. Without an explicit icon the
    /// next palette entry is used, wrapping after the last.
    ///
    /// Returns the icon used.
    pub fn pin(&mut self, positions: &[u64], icon: Option<&str>) -> String {
        let icon = match icon {
            Some(icon) => icon.to_string(),
            None => {
                let icon = PIN_ICONS[self.next_icon % PIN_ICONS.len()];
                self.next_icon += 1;
                icon.to_string()
            }
        };
        self.pins.extend(positions.iter().map(|&pos| Pin {
            pos,
            icon: icon.clone(),
        }));
        icon
    }

    pub fn all(&self) -> &[Pin] {
        &self.pins
    }

    /// Pins strictly inside `(from, to)`.
    pub fn visible(&self, from: u64, to: u64) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(move |p| p.pos > from && p.pos < to)
    }

    pub fn clear(&mut self) {
        self.pins.clear();
        self.next_icon = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_rotates() {
        let mut pins = Pins::new();
        let icons: Vec<_> = (0..7).map(|i| pins.pin(&[i], None)).collect();
        assert_eq!(icons[0], PIN_ICONS[0]);
        assert_eq!(icons[5], PIN_ICONS[5]);
        assert_eq!(icons[6], PIN_ICONS[0]);
    }

    #[test]
    fn explicit_icon_does_not_advance() {
        let mut pins = Pins::new();
        assert_eq!(pins.pin(&[1], Some("custom.png")), "custom.png");
        assert_eq!(pins.pin(&[2], None), PIN_ICONS[0]);
    }

    #[test]
    fn visibility_is_exclusive() {
        let mut pins = Pins::new();
        pins.pin(&[100, 150, 200], None);
        let shown: Vec<_> = pins.visible(100, 200).map(|p| p.pos).collect();
        assert_eq!(shown, vec![150]);
    }
}
