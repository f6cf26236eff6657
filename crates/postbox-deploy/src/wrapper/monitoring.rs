//! Monitoring wrapper: CloudWatch alarms wired to the SNS topics.
//!
//! Account-wide Lambda concurrency at two tiers (notice at 250, alert at
//! 500) and cluster CPU at 65%. `actions_enabled` lets non-production
//! environments keep the alarms without paging anyone.

use serde_json::{Value, json};

use crate::stack::{DeployError, ResourceHandle, Stack};
use crate::wrapper::alerting::AlertingWrapper;
use crate::wrapper::database::DatabaseWrapper;

const LAMBDA_EXEC_NOTICE_THRESHOLD: u32 = 250;
const LAMBDA_EXEC_ALERT_THRESHOLD: u32 = 500;
const DB_CPU_THRESHOLD: u32 = 65;
const EVALUATION_PERIODS: u32 = 1;
const PERIOD_SECONDS: u32 = 300;

pub struct MonitoringWrapper;

impl MonitoringWrapper {
    pub fn build(
        stack: &mut Stack,
        database: &DatabaseWrapper,
        alerting: &AlertingWrapper,
        alarm_actions_enabled: bool,
    ) -> Result<(), DeployError> {
        let lambda_exec = json!({
            "Namespace": "AWS/Lambda",
            "MetricName": "ConcurrentExecutions",
            "Statistic": "Maximum",
            "Dimensions": [],
        });
        create_alarm(
            stack,
            "lambda-exec-notice-alarm",
            &lambda_exec,
            LAMBDA_EXEC_NOTICE_THRESHOLD,
            &alerting.notice_topic,
            alarm_actions_enabled,
        )?;
        create_alarm(
            stack,
            "lambda-exec-alert-alarm",
            &lambda_exec,
            LAMBDA_EXEC_ALERT_THRESHOLD,
            &alerting.alert_topic,
            alarm_actions_enabled,
        )?;

        let db_cpu = json!({
            "Namespace": "AWS/RDS",
            "MetricName": "CPUUtilization",
            "Statistic": "Average",
            "Dimensions": [{
                "Name": "DBClusterIdentifier",
                "Value": database.cluster.reference(),
            }],
        });
        create_alarm(
            stack,
            "db-cpu-util-alarm",
            &db_cpu,
            DB_CPU_THRESHOLD,
            &alerting.alert_topic,
            alarm_actions_enabled,
        )?;
        Ok(())
    }
}

fn create_alarm(
    stack: &mut Stack,
    name_suffix: &str,
    metric: &Value,
    threshold: u32,
    topic: &ResourceHandle,
    actions_enabled: bool,
) -> Result<ResourceHandle, DeployError> {
    let alarm_name = stack.resource_name(name_suffix);
    let mut properties = json!({
        "AlarmName": alarm_name,
        "Threshold": threshold,
        "EvaluationPeriods": EVALUATION_PERIODS,
        "Period": PERIOD_SECONDS,
        "ComparisonOperator": "GreaterThanOrEqualToThreshold",
        "ActionsEnabled": actions_enabled,
        "AlarmActions": [topic.reference()],
    });
    if let (Value::Object(props), Value::Object(metric)) = (&mut properties, metric) {
        for (key, value) in metric {
            props.insert(key.clone(), value.clone());
        }
    }
    stack.add_resource(name_suffix, "AWS::CloudWatch::Alarm", properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrapper::network::NetworkWrapper;

    fn build(actions_enabled: bool) -> crate::template::Template {
        let mut stack = Stack::new("postbox-dev");
        let network = NetworkWrapper::build(&mut stack).unwrap();
        let database =
            DatabaseWrapper::build(&mut stack, &network, "postbox", 1, 0.5, 2.0).unwrap();
        let alerting =
            AlertingWrapper::build(&mut stack, &["ops@example.com".to_string()], &[]).unwrap();
        MonitoringWrapper::build(&mut stack, &database, &alerting, actions_enabled).unwrap();
        stack.synth().unwrap()
    }

    #[test]
    fn test_three_alarms_with_tiered_thresholds() {
        let template = build(true);
        assert_eq!(template.resources_of_kind("AWS::CloudWatch::Alarm").len(), 3);

        let notice = template.resource("PostboxDevLambdaExecNoticeAlarm").unwrap();
        assert_eq!(notice["Properties"]["Threshold"], 250);
        assert_eq!(
            notice["Properties"]["AlarmActions"],
            serde_json::json!([{ "Ref": "PostboxDevNoticeTopic" }])
        );

        let alert = template.resource("PostboxDevLambdaExecAlertAlarm").unwrap();
        assert_eq!(alert["Properties"]["Threshold"], 500);
        assert_eq!(
            alert["Properties"]["AlarmActions"],
            serde_json::json!([{ "Ref": "PostboxDevAlertTopic" }])
        );
    }

    #[test]
    fn test_db_alarm_tracks_cluster_cpu() {
        let template = build(true);
        let alarm = template.resource("PostboxDevDbCpuUtilAlarm").unwrap();
        let props = &alarm["Properties"];
        assert_eq!(props["Namespace"], "AWS/RDS");
        assert_eq!(props["MetricName"], "CPUUtilization");
        assert_eq!(props["Threshold"], 65);
        assert_eq!(
            props["Dimensions"][0]["Value"],
            serde_json::json!({ "Ref": "PostboxDevDb" })
        );
    }

    #[test]
    fn test_actions_can_be_disabled() {
        let template = build(false);
        let alarm = template.resource("PostboxDevDbCpuUtilAlarm").unwrap();
        assert_eq!(alarm["Properties"]["ActionsEnabled"], false);
    }
}
