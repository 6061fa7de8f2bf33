use thiserror::Error;

use super::models::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("limits.max_files_per_task must be at least 1")]
    ZeroFilesPerTask,

    #[error("limits.max_active_tasks must be at least 1")]
    ZeroActiveTasks,

    #[error("limits.allowed_extensions must not be empty")]
    NoAllowedExtensions,

    #[error("allowed extension {0:?} must start with a dot and name at least one character")]
    MalformedExtension(String),

    #[error("workers.count must be at least 1")]
    ZeroWorkers,

    #[error("workers.channel_size must be at least 1")]
    ZeroChannelSize,
}

pub fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.limits.max_files_per_task == 0 {
        return Err(ValidationError::ZeroFilesPerTask);
    }

    if config.limits.max_active_tasks == 0 {
        return Err(ValidationError::ZeroActiveTasks);
    }

    if config.limits.allowed_extensions.is_empty() {
        return Err(ValidationError::NoAllowedExtensions);
    }

    for ext in &config.limits.allowed_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ValidationError::MalformedExtension(ext.clone()));
        }
    }

    if config.workers.count == 0 {
        return Err(ValidationError::ZeroWorkers);
    }

    if config.workers.channel_size == 0 {
        return Err(ValidationError::ZeroChannelSize);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        toml::from_str("").unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn rejects_zero_limits() {
        let mut config = base_config();
        config.limits.max_files_per_task = 0;
        assert_eq!(validate(&config), Err(ValidationError::ZeroFilesPerTask));

        let mut config = base_config();
        config.limits.max_active_tasks = 0;
        assert_eq!(validate(&config), Err(ValidationError::ZeroActiveTasks));
    }

    #[test]
    fn rejects_empty_extension_list() {
        let mut config = base_config();
        config.limits.allowed_extensions.clear();
        assert_eq!(validate(&config), Err(ValidationError::NoAllowedExtensions));
    }

    #[test]
    fn rejects_malformed_extensions() {
        let mut config = base_config();
        config.limits.allowed_extensions = vec!["pdf".to_string()];
        assert_eq!(
            validate(&config),
            Err(ValidationError::MalformedExtension("pdf".to_string()))
        );

        let mut config = base_config();
        config.limits.allowed_extensions = vec![".".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ValidationError::MalformedExtension(_))
        ));
    }

    #[test]
    fn rejects_empty_worker_pool() {
        let mut config = base_config();
        config.workers.count = 0;
        assert_eq!(validate(&config), Err(ValidationError::ZeroWorkers));

        let mut config = base_config();
        config.workers.channel_size = 0;
        assert_eq!(validate(&config), Err(ValidationError::ZeroChannelSize));
    }
}
