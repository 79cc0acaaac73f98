// ABOUTME: View layer for trailhead
// ABOUTME: Indicator and button view models plus the epoch-tagged step renderer

pub mod indicator;
pub mod renderer;

pub use indicator::{
    path_options, IndicatorItem, NavigationButtons, PathOption, StepIndicator, COMPLETED_ICON,
};
pub use renderer::{RenderTicket, RenderedStep, StepRenderer, LOAD_ERROR_MARKUP};
