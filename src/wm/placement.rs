//! Placement Module
//!
//! Where the window list popup appears and which entry it scrolls to.
//! The popup is centered on the requested point and kept on the screen
//! nearest to it.

use tracing::{debug, warn};

use crate::config::WindowListConfig;
use crate::shared::Geometry;
use crate::wm::entry::{Section, WindowRef};
use crate::wm::registry::Registry;

/// Popup show request
#[derive(Debug, Clone, Copy)]
pub struct PopupRequest<'a> {
    /// Point to center on (usually the pointer)
    pub point: (i32, i32),
    pub screens: &'a [Geometry],
    /// Current rectangle when the popup is already positioned
    pub current: Option<Geometry>,
    /// The popup's own window, never chosen as scroll target
    pub popup: Option<WindowRef>,
}

/// Outcome of planning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupPlan {
    /// New rectangle, `None` to leave the popup where it is
    pub geometry: Option<Geometry>,
    /// Entry position to scroll to and select
    pub scroll_to: Option<usize>,
}

/// Popup placement
#[derive(Debug, Clone)]
pub struct PlacementPlanner {
    pub line_height: u32,
    pub min_height_ratio: f64,
    pub max_height_ratio: f64,
    pub width_ratio: f64,
    pub recenter_overlap_ratio: f64,
}

impl PlacementPlanner {
    pub fn new(config: &WindowListConfig) -> Self {
        Self {
            line_height: config.line_height,
            min_height_ratio: config.min_height_ratio,
            max_height_ratio: config.max_height_ratio,
            width_ratio: config.width_ratio,
            recenter_overlap_ratio: config.recenter_overlap_ratio,
        }
    }

    /// Plan showing the popup for `registry`
    pub fn plan(
        &self,
        registry: &Registry,
        request: &PopupRequest<'_>,
        focused: Option<WindowRef>,
        active_workspace: u32,
    ) -> PopupPlan {
        let scroll_to = scroll_target(registry, focused, request.popup, active_workspace);

        let Some(screen) = nearest_screen(request.screens, request.point.0, request.point.1) else {
            warn!("No screens to place the window list on");
            return PopupPlan {
                geometry: None,
                scroll_to,
            };
        };

        let geometry = match request.current {
            Some(current) => self.reshow_geometry(&current, &screen),
            None => {
                let (width, height) = self.desired_size(
                    &screen,
                    registry.workspace_count(),
                    registry.row_count(),
                );
                Some(self.initial_geometry(request.point, width, height, &screen))
            }
        };

        debug!("Window list popup: {:?}, scroll to {:?}", geometry, scroll_to);
        PopupPlan {
            geometry,
            scroll_to,
        }
    }

    /// Size for a list with `workspace_count` sections and `row_count` rows
    pub fn desired_size(&self, screen: &Geometry, workspace_count: u32, row_count: usize) -> (u32, u32) {
        let lines = 1 + workspace_count as u64 + row_count as u64;
        let needed = (self.line_height as u64).saturating_mul(lines) as f64;

        let screen_height = screen.height as f64;
        let height = needed
            .min(self.max_height_ratio * screen_height)
            .max(self.min_height_ratio * screen_height);
        let width = self.width_ratio * screen.width as f64;

        (width as u32, height as u32)
    }

    /// Rectangle centered on `point`, kept inside `screen`
    pub fn initial_geometry(&self, point: (i32, i32), width: u32, height: u32, screen: &Geometry) -> Geometry {
        let x = point.0 as i64 - (width / 2) as i64;
        let y = point.1 as i64 - (height / 2) as i64;
        let rect = Geometry::new(saturate(x), saturate(y), width, height);
        clamp_to_screen(&rect, screen)
    }

    /// New rectangle for a popup shown again at `current`, `None` when it
    /// is visible enough to stay put
    pub fn reshow_geometry(&self, current: &Geometry, screen: &Geometry) -> Option<Geometry> {
        let visible = current.overlap(screen) as f64;
        if visible >= self.recenter_overlap_ratio * current.area() as f64 {
            return None;
        }

        debug!("Window list mostly off screen, recentering");
        let (cx, cy) = screen.center();
        Some(self.initial_geometry(
            (cx, cy),
            current.width.min(screen.width),
            current.height.min(screen.height),
            screen,
        ))
    }
}

impl Default for PlacementPlanner {
    fn default() -> Self {
        Self::new(&WindowListConfig::default())
    }
}

/// Screen containing the point, or the closest one
pub fn nearest_screen(screens: &[Geometry], x: i32, y: i32) -> Option<Geometry> {
    screens
        .iter()
        .find(|screen| screen.contains_point(x, y))
        .or_else(|| screens.iter().min_by_key(|screen| screen.distance_sq(x, y)))
        .copied()
}

/// Shift `rect` inside `screen`, shrinking it first if it does not fit
pub fn clamp_to_screen(rect: &Geometry, screen: &Geometry) -> Geometry {
    let width = rect.width.min(screen.width);
    let height = rect.height.min(screen.height);

    let max_x = screen.right() - width as i64;
    let max_y = screen.bottom() - height as i64;
    let x = (rect.x as i64).clamp(screen.x as i64, max_x);
    let y = (rect.y as i64).clamp(screen.y as i64, max_y);

    Geometry::new(saturate(x), saturate(y), width, height)
}

/// Entry to scroll to: the focused window's row unless it is the popup
/// itself, else the header of the active workspace
pub fn scroll_target(
    registry: &Registry,
    focused: Option<WindowRef>,
    popup: Option<WindowRef>,
    active_workspace: u32,
) -> Option<usize> {
    let focused_row = focused
        .filter(|&window| Some(window) != popup)
        .and_then(|window| registry.position_of_window(window));
    if focused_row.is_some() {
        return focused_row;
    }

    let section = Section::Workspace(active_workspace).clamp(registry.workspace_count());
    registry.header_position(section)
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::registry::NewRow;

    fn screen() -> Geometry {
        Geometry::new(0, 0, 1000, 800)
    }

    #[test]
    fn test_desired_size_respects_bounds() {
        let planner = PlacementPlanner::default();
        assert_eq!(planner.desired_size(&screen(), 2, 3), (500, 320));
        // 18 * 31 = 558 lies between 320 and 720
        assert_eq!(planner.desired_size(&screen(), 2, 28), (500, 558));
        assert_eq!(planner.desired_size(&screen(), 4, 500), (500, 720));
    }

    #[test]
    fn test_initial_geometry_is_shifted_inside() {
        let planner = PlacementPlanner::default();
        let rect = planner.initial_geometry((990, 790), 500, 320, &screen());
        assert_eq!(rect, Geometry::new(500, 480, 500, 320));

        let rect = planner.initial_geometry((500, 400), 500, 320, &screen());
        assert_eq!(rect, Geometry::new(250, 240, 500, 320));

        let second = Geometry::new(1000, 0, 800, 600);
        let rect = planner.initial_geometry((1005, 5), 400, 240, &second);
        assert_eq!(rect, Geometry::new(1000, 0, 400, 240));
    }

    #[test]
    fn test_oversized_popup_is_clamped_to_screen() {
        let rect = clamp_to_screen(&Geometry::new(-50, -50, 2000, 1500), &screen());
        assert_eq!(rect, screen());

        let offset = Geometry::new(1000, 100, 800, 600);
        let rect = clamp_to_screen(&Geometry::new(900, 0, 1200, 900), &offset);
        assert_eq!(rect, offset);
    }

    #[test]
    fn test_reshow_recenters_only_when_mostly_off_screen() {
        let planner = PlacementPlanner::default();

        // 200 of 400 pixels wide visible: half on screen
        let half = Geometry::new(800, 100, 400, 200);
        assert_eq!(planner.reshow_geometry(&half, &screen()), None);

        // 40 of 400 pixels wide visible: 10%
        let mostly_off = Geometry::new(960, 100, 400, 200);
        assert_eq!(
            planner.reshow_geometry(&mostly_off, &screen()),
            Some(Geometry::new(300, 300, 400, 200))
        );

        let gone = Geometry::new(3000, 3000, 400, 200);
        assert!(planner.reshow_geometry(&gone, &screen()).is_some());
    }

    #[test]
    fn test_nearest_screen() {
        let screens = [screen(), Geometry::new(1000, 0, 800, 600)];
        assert_eq!(nearest_screen(&screens, 1200, 300), Some(screens[1]));
        assert_eq!(nearest_screen(&screens, 10, 10), Some(screens[0]));
        // below the right-hand screen
        assert_eq!(nearest_screen(&screens, 1500, 700), Some(screens[1]));
        assert_eq!(nearest_screen(&[], 0, 0), None);
    }

    #[test]
    fn test_scroll_target_prefers_focused_row() {
        let mut registry = Registry::new(2);
        registry.insert(NewRow::new(10, Section::Workspace(0)));
        registry.insert(NewRow::new(20, Section::Workspace(1)));

        let row = registry.position_of_window(20);
        assert_eq!(scroll_target(&registry, Some(20), None, 0), row);

        // the popup itself falls back to the active workspace header
        assert_eq!(
            scroll_target(&registry, Some(20), Some(20), 1),
            registry.header_position(Section::Workspace(1))
        );
        assert_eq!(
            scroll_target(&registry, None, None, 7),
            registry.header_position(Section::All)
        );
    }

    #[test]
    fn test_plan_places_new_popup() {
        let mut registry = Registry::new(2);
        for window in 1..=3 {
            registry.insert(NewRow::new(window, Section::Workspace(0)));
        }
        let screens = [screen()];
        let request = PopupRequest {
            point: (990, 790),
            screens: &screens,
            current: None,
            popup: None,
        };

        let plan = PlacementPlanner::default().plan(&registry, &request, Some(2), 0);
        assert_eq!(plan.geometry, Some(Geometry::new(500, 480, 500, 320)));
        assert_eq!(plan.scroll_to, registry.position_of_window(2));

        let request = PopupRequest {
            current: Some(Geometry::new(500, 480, 500, 320)),
            ..request
        };
        let plan = PlacementPlanner::default().plan(&registry, &request, None, 0);
        assert_eq!(plan.geometry, None);
        assert_eq!(plan.scroll_to, Some(0));
    }
}
