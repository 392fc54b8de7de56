use crate::{ThresholdPolicy, BURST_URL_PROFILE_CREATOR, DEFAULT_PIPE_PORT};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds, DurationSecondsWithFrac};
use std::time::Duration;

/// Run configuration handed to the harness as a JSON document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub profiles_creator_class: String,
    pub profiles_creator_class_params: ProfileCreatorParams,
    pub timing: Timing,
    pub pipe_port: u16,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            profiles_creator_class: BURST_URL_PROFILE_CREATOR.to_string(),
            profiles_creator_class_params: ProfileCreatorParams::default(),
            timing: Timing::default(),
            pipe_port: DEFAULT_PIPE_PORT,
        }
    }
}

impl RunConfig {
    /// Serialize with keys in sorted order.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        // `serde_json::Value` objects keep their keys sorted.
        let value = serde_json::to_value(self)?;
        serde_json::to_string(&value)
    }

    /// Default thresholds scaled by the burst sizes of this run.
    pub fn threshold_policy(&self) -> ThresholdPolicy {
        let params = &self.profiles_creator_class_params;
        ThresholdPolicy::default().bursts(
            params.burst_size_per_popular_host,
            params.burst_size_per_less_popular_host,
        )
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCreatorParams {
    pub host_list_file: String,
    /// Fraction of hosts that are considered popular.
    pub popular_host_fraction: f64,
    pub users_per_popular_host: u32,
    pub users_per_less_popular_host: u32,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub mean_think_time: Duration,
    pub burst_size_per_popular_host: u32,
    pub burst_size_per_less_popular_host: u32,
    pub mean_response_time_sampling_interval: u64,
    pub generator_parameters: GeneratorParameters,
}

impl Default for ProfileCreatorParams {
    fn default() -> Self {
        Self {
            host_list_file: String::new(),
            popular_host_fraction: 0.2,
            users_per_popular_host: 25,
            users_per_less_popular_host: 5,
            mean_think_time: Duration::from_secs(5),
            burst_size_per_popular_host: crate::DEFAULT_POPULAR_HOST_BURST,
            burst_size_per_less_popular_host: crate::DEFAULT_LESS_POPULAR_HOST_BURST,
            mean_response_time_sampling_interval: 100,
            generator_parameters: GeneratorParameters::default(),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorParameters {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub connection_timeout_msecs: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub socket_timeout_msecs: Duration,
}

impl Default for GeneratorParameters {
    fn default() -> Self {
        Self {
            connection_timeout_msecs: Duration::from_secs(1),
            socket_timeout_msecs: Duration::from_secs(1),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    #[serde_as(as = "DurationSeconds<u64>")]
    pub ramp_up: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub duration: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub ramp_down: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            ramp_up: Duration::from_secs(10),
            duration: Duration::from_secs(60),
            ramp_down: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_document() {
        let value: serde_json::Value =
            serde_json::from_str(&RunConfig::default().to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "pipePort": 7851,
                "profilesCreatorClass": "radlab.rain.workload.httptest.BurstUrlProfileCreator",
                "profilesCreatorClassParams": {
                    "burstSizePerLessPopularHost": 2,
                    "burstSizePerPopularHost": 5,
                    "generatorParameters": {
                        "connectionTimeoutMsecs": 1000,
                        "socketTimeoutMsecs": 1000
                    },
                    "hostListFile": "",
                    "meanResponseTimeSamplingInterval": 100,
                    "meanThinkTime": 5.0,
                    "popularHostFraction": 0.2,
                    "usersPerLessPopularHost": 5,
                    "usersPerPopularHost": 25
                },
                "timing": { "duration": 60, "rampDown": 10, "rampUp": 10 }
            })
        );
    }

    #[test]
    fn keys_are_sorted() {
        let json = RunConfig::default().to_json().unwrap();
        let pipe = json.find("\"pipePort\"").unwrap();
        let class = json.find("\"profilesCreatorClass\"").unwrap();
        let timing = json.find("\"timing\"").unwrap();
        assert!(pipe < class && class < timing);
    }

    #[test]
    fn reads_back_written_document() {
        let mut config = RunConfig::default();
        config.timing.duration = Duration::from_secs(300);
        config.profiles_creator_class_params.mean_think_time = Duration::from_millis(2500);

        let parsed: RunConfig = serde_json::from_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn policy_follows_burst_sizes() {
        let mut config = RunConfig::default();
        config.profiles_creator_class_params.burst_size_per_popular_host = 9;
        config.profiles_creator_class_params.burst_size_per_less_popular_host = 0;

        let thresholds = config.threshold_policy().thresholds();
        assert_eq!(
            thresholds.response_time_for("BurstUrl(9)").map(|t| t.p99),
            Some(5.0)
        );
        assert_eq!(
            thresholds.response_time_for("BurstUrl(0)").map(|t| t.p90),
            Some(0.5)
        );
    }
}
