//! Reproducible shell snippets rendered from a configuration.

use std::fmt::Write;

use crate::config::Config;

impl Config {
    /// Renders the kubectl and sonobuoy commands an operator can replay
    /// against the cluster.
    ///
    /// Returns an empty string while [`Config::kubeconfig_path`] is unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use eksconfig::Config;
    ///
    /// let mut cfg = Config::new_default();
    /// cfg.kubeconfig_path = "/tmp/c1.kubeconfig.yaml".to_string();
    /// let script = cfg.kubectl_commands();
    /// assert!(script.starts_with("# kubectl commands\n"));
    /// assert!(script.contains("--kubeconfig=/tmp/c1.kubeconfig.yaml get nodes"));
    /// ```
    #[must_use]
    pub fn kubectl_commands(&self) -> String {
        if self.kubeconfig_path.is_empty() {
            return String::new();
        }
        let kubeconfig = &self.kubeconfig_path;
        let kubectl = if self.kubectl_path.is_empty() {
            "kubectl"
        } else {
            self.kubectl_path.as_str()
        };
        let image = format!(
            "gcr.io/heptio-images/kube-conformance:v{}.0",
            self.parameters.version
        );

        let mut s = String::from("# kubectl commands\n");
        for args in [
            "version",
            "cluster-info",
            "get cs",
            "get nodes",
            "get pods --namespace kube-system",
            "get ds --namespace kube-system",
            "get secrets --all-namespaces",
            "get configmap --all-namespaces",
            "get all --all-namespaces",
        ] {
            let _ = writeln!(s, "{kubectl} --kubeconfig={kubeconfig} {args}");
        }

        s.push_str("\n# sonobuoy commands\n");
        for mode in ["--mode Quick \\\n  ", ""] {
            let _ = write!(
                s,
                "sonobuoy delete --wait --kubeconfig={kubeconfig}\n\
                 sonobuoy run \\\n  {mode}--wait \\\n  \
                 --kube-conformance-image {image} \\\n  --kubeconfig={kubeconfig}\n\n"
            );
        }
        let _ = write!(
            s,
            "sonobuoy status --kubeconfig={kubeconfig}\n\n\
             results=$(sonobuoy retrieve --kubeconfig={kubeconfig})\n\
             sonobuoy e2e --kubeconfig={kubeconfig} $results --show all\n\
             sonobuoy e2e --kubeconfig={kubeconfig} $results\n"
        );
        s
    }
}
