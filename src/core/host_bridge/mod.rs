//=========================================================================
// Host Bridge
//=========================================================================
//
// Control channel from the host application into the running engine.
//
// Components:
// - `interface`: Control event definitions (the contract)
// - `event_collector`: Engine-side draining and application of events
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::EventCollector;
pub(crate) use interface::HostEvent;
