pub struct DefaultsConfig {
    pub overwrite: bool,
    pub pretty: bool,
    pub latex_names: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            pretty: true,
            latex_names: true,
        }
    }
}
