mod cache;
mod channel;
mod common;
mod lookup;
mod session;
mod ssm;

pub use self::cache::{cache_status, clear_caches};
pub use self::channel::{list_basechannels, list_childchannels};
pub use self::lookup::{
    erratum_id, erratum_name, expand_errata, expand_systems, package_id, package_name, system_id, system_name,
};
pub use self::session::{get_apiversion, get_serverversion, get_session, login, logout, whoami, whoamitalkingto};
pub use self::ssm::{ssm_add, ssm_clear, ssm_list, ssm_remove};
