use serde::{Deserialize, Serialize};

/// Geometry used when no display can be probed at all.
pub const DEFAULT_GEOMETRY: Geometry = Geometry {
    x: 0,
    y: 0,
    width: 80,
    height: 24,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

/// Which kind of display the user wants the view on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy)]
pub struct DisplayInfo {
    pub geometry: Geometry,
    pub primary: bool,
}

/// Pick the display to render on, once at startup. The fallback chain is
/// an explicit ordered list of predicates: requested kind, then the other
/// kind, then anything, then the hard-coded default.
pub fn select_geometry(displays: &[DisplayInfo], prefer: TargetKind) -> Geometry {
    let selectors: [fn(&DisplayInfo) -> bool; 3] = match prefer {
        TargetKind::Primary => [|d| d.primary, |d| !d.primary, |_| true],
        TargetKind::Secondary => [|d| !d.primary, |d| d.primary, |_| true],
    };

    for selector in selectors {
        if let Some(found) = displays.iter().find(|d| selector(d)) {
            return found.geometry;
        }
    }
    DEFAULT_GEOMETRY
}

/// The terminal is the one display we can see; treat it as primary.
pub fn probe() -> Vec<DisplayInfo> {
    match crossterm::terminal::size() {
        Ok((width, height)) => vec![DisplayInfo {
            geometry: Geometry {
                x: 0,
                y: 0,
                width,
                height,
            },
            primary: true,
        }],
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(width: u16, primary: bool) -> DisplayInfo {
        DisplayInfo {
            geometry: Geometry {
                x: 0,
                y: 0,
                width,
                height: 50,
            },
            primary,
        }
    }

    #[test]
    fn prefers_the_requested_kind() {
        let displays = [display(100, true), display(200, false)];
        assert_eq!(select_geometry(&displays, TargetKind::Primary).width, 100);
        assert_eq!(select_geometry(&displays, TargetKind::Secondary).width, 200);
    }

    #[test]
    fn falls_back_to_the_other_kind() {
        let only_primary = [display(100, true)];
        assert_eq!(
            select_geometry(&only_primary, TargetKind::Secondary).width,
            100
        );

        let only_secondary = [display(200, false)];
        assert_eq!(
            select_geometry(&only_secondary, TargetKind::Primary).width,
            200
        );
    }

    #[test]
    fn no_displays_yields_the_default() {
        assert_eq!(select_geometry(&[], TargetKind::Primary), DEFAULT_GEOMETRY);
        assert_eq!(
            select_geometry(&[], TargetKind::Secondary),
            DEFAULT_GEOMETRY
        );
    }

    #[test]
    fn first_match_wins_among_equals() {
        let displays = [display(101, false), display(102, false), display(103, true)];
        assert_eq!(select_geometry(&displays, TargetKind::Secondary).width, 101);
        assert_eq!(select_geometry(&displays, TargetKind::Primary).width, 103);
    }
}
