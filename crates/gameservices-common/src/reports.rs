use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartData {
    pub active_instances_time_series: Vec<i32>,
    pub standby_instances_time_series: Vec<i32>,
    pub quarantined_instances_time_series: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageData {
    pub active_instance_count: i32,
    pub standby_instance_count: i32,
    pub quarantined_instance_count: i32,
    pub log_capacity: i32,
    pub log_usage: i32,
}

/// Monitoring dashboard for a compute instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSummary {
    pub chart_data: ChartData,
    pub usage_data: UsageData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeoRegionDeploymentInfo {
    pub geo_region: String,
    pub progress: i32,
    pub usage: i32,
    pub standing_by_instances: i32,
    pub active_instances: i32,
    pub quarantined_instances: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageDeploymentInfo {
    pub game_server_image_id: String,
    pub sandbox: String,
    pub total_progress: i32,
    pub total_usage: i32,
    pub total_active: i32,
    pub total_quarantined: i32,
    pub geo_region_infos: Vec<GeoRegionDeploymentInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentReport {
    pub total_usage: i32,
    pub total_active: i32,
    pub total_quarantined: i32,
    pub deployments: Vec<PackageDeploymentInfo>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeoRegionPoolInfo {
    pub geo_region: String,
    pub total_instances: i32,
    pub active_instances: i32,
    pub standby_instances: i32,
    pub quarantined_instances: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolReport {
    pub total: i32,
    pub total_active: i32,
    #[serde(rename = "totalStandBy")]
    pub total_standby: i32,
    pub total_quarantined: i32,
    pub pools: Vec<GeoRegionPoolInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_report_standby_spelling() {
        let report: PoolReport = serde_json::from_str(
            r#"{"total":10,"totalActive":6,"totalStandBy":3,"totalQuarantined":1,
                "pools":[{"geoRegion":"West US","totalInstances":10,"standbyInstances":3}]}"#,
        )
        .unwrap();
        assert_eq!(report.total_standby, 3);
        assert_eq!(report.pools[0].geo_region, "West US");
        assert_eq!(report.pools[0].standby_instances, 3);
        assert_eq!(report.pools[0].active_instances, 0);
    }

    #[test]
    fn test_deployment_report_nested_regions() {
        let report: DeploymentReport = serde_json::from_str(
            r#"{"totalUsage":4,"deployments":[{"gameServerImageId":"img","sandbox":"XDKS.1",
                "geoRegionInfos":[{"geoRegion":"East US","standingByInstances":2}]}]}"#,
        )
        .unwrap();
        assert_eq!(report.total_usage, 4);
        let deployment = &report.deployments[0];
        assert_eq!(deployment.sandbox, "XDKS.1");
        assert_eq!(deployment.geo_region_infos[0].standing_by_instances, 2);
    }

    #[test]
    fn test_empty_dashboard() {
        let summary: DashboardSummary = serde_json::from_str("{}").unwrap();
        assert_eq!(summary, DashboardSummary::default());
    }

    #[test]
    fn test_json_round_trip() {
        crate::assert_json_round_trip(&DashboardSummary {
            chart_data: ChartData {
                active_instances_time_series: vec![1, 2, 3],
                standby_instances_time_series: vec![4, 4],
                quarantined_instances_time_series: vec![0],
            },
            usage_data: UsageData {
                active_instance_count: 3,
                standby_instance_count: 4,
                quarantined_instance_count: 0,
                log_capacity: 100,
                log_usage: 12,
            },
        });

        crate::assert_json_round_trip(&DeploymentReport {
            total_usage: 7,
            total_active: 5,
            total_quarantined: 1,
            deployments: vec![PackageDeploymentInfo {
                game_server_image_id: "img".to_string(),
                sandbox: "XDKS.1".to_string(),
                total_progress: 100,
                total_usage: 7,
                total_active: 5,
                total_quarantined: 1,
                geo_region_infos: vec![
                    GeoRegionDeploymentInfo {
                        geo_region: "West US".to_string(),
                        progress: 100,
                        usage: 4,
                        standing_by_instances: 2,
                        active_instances: 3,
                        quarantined_instances: 0,
                    },
                    GeoRegionDeploymentInfo {
                        geo_region: "North Europe".to_string(),
                        progress: 50,
                        usage: 3,
                        standing_by_instances: 1,
                        active_instances: 2,
                        quarantined_instances: 1,
                    },
                ],
            }],
        });

        crate::assert_json_round_trip(&PoolReport {
            total: 10,
            total_active: 6,
            total_standby: 3,
            total_quarantined: 1,
            pools: vec![GeoRegionPoolInfo {
                geo_region: "West US".to_string(),
                total_instances: 10,
                active_instances: 6,
                standby_instances: 3,
                quarantined_instances: 1,
            }],
        });
    }
}
