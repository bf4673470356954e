pub mod app;
pub mod diagram;
pub mod k8s;
pub mod label;
pub mod telemetry;
pub mod workload;
