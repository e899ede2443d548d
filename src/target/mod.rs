//! Target endpoint description, resolved address state and the DNS refresher.
mod addresses;
mod endpoint;
mod resolver;


pub use addresses::{AddressSet, AddressState};
pub use endpoint::{Endpoint, Scheme};
pub use resolver::{
    AddressFamily, ChangeReceiver, ChangeSender, HostResolver, SystemResolver, change_channel,
    run_resolver,
};
