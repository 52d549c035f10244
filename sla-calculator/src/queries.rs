//! Query text sent to the aggregation backend.

use oncall_config::QuerySelector;

const DELETE_SUCCESS_METRIC: &str = "prober_delete_team_scenario_success_total";
const DELETE_TOTAL_METRIC: &str = "prober_delete_team_scenario_total";
const CREATE_DURATION_METRIC: &str = "prober_create_team_scenario_duration_milliseconds";

/// The three queries evaluated on every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorQueries {
    delete_success: String,
    delete_total: String,
    create_duration_p98: String,
}

impl IndicatorQueries {
    /// Builds the queries for the prober scraped under `selector`.
    #[must_use]
    pub fn new(selector: &QuerySelector) -> Self {
        let labels = format!(
            r#"{{system="{}", group="{}"}}[{}]"#,
            selector.system, selector.group, selector.window
        );
        Self {
            delete_success: format!("pql increase({DELETE_SUCCESS_METRIC}{labels})"),
            delete_total: format!("pql increase({DELETE_TOTAL_METRIC}{labels})"),
            create_duration_p98: format!(
                "pql quantile_over_time(0.98, {CREATE_DURATION_METRIC}{labels})"
            ),
        }
    }

    /// Successful deletes within the window.
    #[must_use]
    pub fn delete_success(&self) -> &str {
        &self.delete_success
    }

    /// Delete attempts within the window.
    #[must_use]
    pub fn delete_total(&self) -> &str {
        &self.delete_total
    }

    /// 98th percentile of the create duration within the window.
    #[must_use]
    pub fn create_duration_p98(&self) -> &str {
        &self.create_duration_p98
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_selector_into_every_query() {
        let queries = IndicatorQueries::new(&QuerySelector {
            system: "oncall-prober-service".to_owned(),
            group: "ab5_statsenko".to_owned(),
            window: "1m".to_owned(),
        });

        assert_eq!(
            queries.delete_success(),
            r#"pql increase(prober_delete_team_scenario_success_total{system="oncall-prober-service", group="ab5_statsenko"}[1m])"#
        );
        assert_eq!(
            queries.delete_total(),
            r#"pql increase(prober_delete_team_scenario_total{system="oncall-prober-service", group="ab5_statsenko"}[1m])"#
        );
        assert_eq!(
            queries.create_duration_p98(),
            r#"pql quantile_over_time(0.98, prober_create_team_scenario_duration_milliseconds{system="oncall-prober-service", group="ab5_statsenko"}[1m])"#
        );
    }
}
