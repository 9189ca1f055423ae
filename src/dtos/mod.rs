pub mod dashboarddtos;
pub mod jobdtos;
pub mod userdtos;

pub use dashboarddtos::*;
pub use jobdtos::*;
pub use userdtos::*;
