// Library root
// -----------
// The binary (`main.rs`) wires these modules together into the
// interactive menu.
//
// Module responsibilities:
// - `config`: reads the API key, base URL and data directory from the
//   environment.
// - `api`: the `AssistantsApi` seam and its blocking HTTP implementation.
// - `store`: the local JSON record of created thread ids.
// - `actions`: the menu operations, run against an injected `Session`.
// - `ui`: menu table, input parsing and the read-eval loop.
pub mod actions;
pub mod api;
pub mod config;
pub mod store;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;
