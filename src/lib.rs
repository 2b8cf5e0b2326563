pub mod error;

pub mod common {
    pub mod address;
    pub mod cmd_defs;
    pub mod commands;
    pub mod defs;
    pub mod driver_commands;
}

pub mod gear {
    pub mod address;
    pub mod cmd_defs;
    pub mod commands_102;
    pub mod control;
    pub mod status;
}

pub mod control {
    pub mod address;
    pub mod cmd_defs;
    pub mod commands_103;
    pub mod events;
    pub mod sensors;
}

pub mod drivers;

pub mod utils {
    pub mod address_pool;
    pub mod commission;
    pub mod decode;
    pub mod dyn_future;
}
