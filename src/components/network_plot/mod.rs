//! Force-directed network plot rendered as SVG.
//!
//! - [`prepare`] turns [`GraphData`](crate::graph::GraphData) into a
//!   position-independent [`Scene`] plus a [`Simulation`]
//! - [`PreparedPlot::mount`] materializes the scene in the DOM, ticks the
//!   simulation once per frame and wires dragging, panning, zooming and
//!   hover-raise; the returned [`SceneHandle`] cancels everything
//! - [`render_static`] lays the graph out headless and returns an SVG string
//!
//! # Example
//!
//! ```ignore
//! use inventory_graph::{NetworkPlot, RenderOptions};
//!
//! view! { <NetworkPlot data=graph options=RenderOptions::default() /> }
//! ```

mod component;
mod dom;
mod driver;
mod fit;
mod options;
mod plot;
pub mod scene;
mod scheduler;
pub mod simulation;
mod state;
mod svg;
pub mod theme;

pub use component::NetworkPlot;
pub use dom::SceneHandle;
pub use driver::SimulationHandle;
pub use fit::AutoFit;
pub use options::{FitOptions, RenderOptions};
pub use plot::{PreparedPlot, prepare, render, render_static, simulation_parameters};
pub use scene::Scene;
pub use scheduler::{AnimationFrames, FrameScheduler, Timer};
pub use simulation::{Simulation, SimulationParameters};
pub use state::{ViewBox, ViewTransform};
pub use svg::SvgSnapshot;
