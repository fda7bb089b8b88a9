// # dyndnsd
//
// Process-level glue shared by the `dyndnsd` daemon and the `dyndns-health`
// check. All update logic lives in dyndns-core.

pub mod logging;
