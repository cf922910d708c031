use once_cell::sync::OnceCell;

static CONFIG: OnceCell<GlobalConfig> = OnceCell::new();

/// Process-wide options set once from the global CLI flags.
#[derive(Debug, Default)]
pub struct GlobalConfig {
    pub verbose: bool,
    pub ignore_prerequisites: bool,
}

pub fn init_global_config(config: GlobalConfig) {
    // A second call keeps the first value.
    let _ = CONFIG.set(config);
}

pub fn global_config() -> &'static GlobalConfig {
    CONFIG.get_or_init(GlobalConfig::default)
}
