#![allow(dead_code)]

use std::time::Duration;

use gameservices_sdk::{ClientConfig, GameServicesClient, PollPolicy};
use mockito::{Matcher, ServerGuard};

pub const SUBSCRIPTION: &str = "sub-123";
pub const COMPUTE_ROOT: &str = "/cloudservices/gameservices/resources/gameservices/~/xboxlivecompute";

/// Matches a request path under the test subscription, ignoring the query.
pub fn path(suffix: &str) -> Matcher {
    Matcher::Regex(format!("^/{}{}(\\?|$)", SUBSCRIPTION, suffix))
}

pub fn compute_path(instance: &str, suffix: &str) -> Matcher {
    path(&format!("{}/{}{}", COMPUTE_ROOT, instance, suffix))
}

/// Matches only requests without a query string.
pub fn no_query() -> Matcher {
    Matcher::Regex("^$".to_string())
}

pub fn fast_poll(attempts: u32) -> PollPolicy {
    PollPolicy::new(attempts, Duration::from_millis(1))
}

pub fn config_for(server: &ServerGuard) -> ClientConfig {
    ClientConfig::new(SUBSCRIPTION)
        .with_endpoint(server.url())
        .with_poll_policy(fast_poll(10))
}

pub fn client_for(server: &ServerGuard) -> GameServicesClient {
    GameServicesClient::from_config(&config_for(server)).expect("client")
}

pub fn cloud_service_listing(resources: &[&str]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<CloudService xmlns="http://schemas.microsoft.com/windowsazure">
  <Name>gameservices</Name>
  <Resources>{}</Resources>
</CloudService>"#,
        resources.concat()
    )
}

pub fn compute_resource(name: &str, json: &str, errored: bool) -> String {
    let status = if errored {
        "<OperationStatus><Error><Code>500</Code><Message>Provisioning failed</Message></Error></OperationStatus>"
    } else {
        "<OperationStatus><Result>Succeeded</Result></OperationStatus>"
    };
    format!(
        "<Resource><Name>{}</Name><IntrinsicSettings><![CDATA[{}]]></IntrinsicSettings>{}</Resource>",
        name, json, status
    )
}
