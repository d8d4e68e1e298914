//! Command to list the writable environment variables.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Args;
use eksconfig::EnvironmentBinder;

/// Print every writable environment variable, one per line.
#[derive(Args)]
pub struct EnvKeysCommand {
    /// Only print keys starting with this prefix
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,
}

impl EnvKeysCommand {
    pub fn execute(self, _global: &GlobalOptions) -> Result<(), CliError> {
        let keys = filter_keys(EnvironmentBinder::env_keys(), self.prefix.as_deref());
        if keys.is_empty() {
            return Err(CliError::SemanticFailure(format!(
                "no environment keys match prefix {:?}",
                self.prefix.unwrap_or_default()
            )));
        }
        for key in keys {
            println!("{key}");
        }
        Ok(())
    }
}

fn filter_keys(keys: Vec<String>, prefix: Option<&str>) -> Vec<String> {
    match prefix {
        Some(prefix) => keys.into_iter().filter(|k| k.starts_with(prefix)).collect(),
        None => keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keys() {
        let keys = vec![
            "AWS_K8S_TESTER_EKS_NAME".to_string(),
            "AWS_K8S_TESTER_EKS_ADD_ON_JOBS_PI_ENABLE".to_string(),
        ];
        assert_eq!(filter_keys(keys.clone(), None).len(), 2);
        assert_eq!(
            filter_keys(keys.clone(), Some("AWS_K8S_TESTER_EKS_ADD_ON_")),
            vec!["AWS_K8S_TESTER_EKS_ADD_ON_JOBS_PI_ENABLE".to_string()]
        );
        assert!(filter_keys(keys, Some("NOPE")).is_empty());
    }
}
