//! Collect and delete commands

use crate::config::{CollectArgs, Command, Config};
use anyhow::Context;
use listprune_core::difference::build_work_queue;
use listprune_core::{
    Aggregator, DeletionDriver, DriverReport, FixedInterval, ListGroup, MembershipSet,
    MembershipSource, Pacer, ProfileEraser, SnapshotFile,
};
use listprune_klaviyo::KlaviyoClient;
use std::path::Path;
use tracing::info;

/// Run the configured command against Klaviyo
pub async fn execute(config: &Config) -> anyhow::Result<()> {
    let client =
        KlaviyoClient::new(config.client_config()).context("Failed to build Klaviyo client")?;
    let queue = SnapshotFile::new(config.queue_path());

    match &config.command {
        Command::Collect(args) => {
            collect(&client, &config.data_dir, args, &queue).await?;
        }
        Command::Delete(args) => {
            delete(&client, &queue, FixedInterval::new(args.min_interval())).await?;
        }
        Command::Run {
            collect: collect_args,
            delete: delete_args,
        } => {
            collect(&client, &config.data_dir, collect_args, &queue).await?;
            delete(&client, &queue, FixedInterval::new(delete_args.min_interval())).await?;
        }
    }
    Ok(())
}

/// Aggregate both list groups and write a fresh work queue
pub async fn collect<S: MembershipSource + ?Sized>(
    source: &S,
    data_dir: &Path,
    args: &CollectArgs,
    queue: &SnapshotFile,
) -> anyhow::Result<MembershipSet> {
    let aggregator = Aggregator::new(source).with_page_size(args.page_size);

    let reference = aggregator
        .collect_group(ListGroup::Reference, &args.reference_lists, data_dir)
        .await
        .context("Collecting reference lists failed")?;
    let exclusion = aggregator
        .collect_group(ListGroup::Exclusion, &args.exclusion_lists, data_dir)
        .await
        .context("Collecting exclusion lists failed")?;

    build_work_queue(&reference, &exclusion, queue)
        .with_context(|| format!("Writing work queue {} failed", queue.path().display()))
}

/// Drain the work queue
pub async fn delete<E: ProfileEraser + ?Sized, P: Pacer>(
    eraser: &E,
    queue: &SnapshotFile,
    pacer: P,
) -> anyhow::Result<DriverReport> {
    if !queue.exists() {
        anyhow::bail!(
            "No work queue at {}; run `listprune collect` first",
            queue.path().display()
        );
    }

    let report = DeletionDriver::new(eraser, queue.clone(), pacer)
        .run()
        .await
        .context("Deletion run aborted")?;

    if report.remaining > 0 {
        info!(
            remaining = report.remaining,
            "Profiles left in queue; re-run `listprune delete` to retry them"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listprune_core::{Identifier, Unpaced};
    use listprune_klaviyo::ClientConfig;
    use serde_json::json;
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_list(server: &MockServer, list_id: &str, members: &[&str]) {
        let data: Vec<_> = members
            .iter()
            .map(|id| json!({ "type": "profile", "id": id }))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/api/lists/{list_id}/profiles/")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": data, "links": { "next": null } })),
            )
            .mount(server)
            .await;
    }

    async fn mount_deletion(server: &MockServer, profile_id: &str, status: u16) {
        Mock::given(method("POST"))
            .and(path("/api/data-privacy-deletion-jobs/"))
            .and(body_partial_json(
                json!({ "data": { "attributes": { "profile": { "data": { "id": profile_id } } } } }),
            ))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> KlaviyoClient {
        KlaviyoClient::new(ClientConfig::new("pk_test").with_base_url(server.uri())).unwrap()
    }

    fn lists(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_collect_then_delete_with_one_failure() {
        let server = MockServer::start().await;
        mount_list(&server, "M1", &["A", "B", "C"]).await;
        mount_list(&server, "M2", &["C", "D"]).await;
        mount_list(&server, "X1", &["B"]).await;
        mount_deletion(&server, "A", 202).await;
        mount_deletion(&server, "C", 503).await;
        mount_deletion(&server, "D", 202).await;

        let dir = tempdir().unwrap();
        let queue = SnapshotFile::new(dir.path().join("unique_master_profiles.csv"));
        let client = client_for(&server);
        let args = CollectArgs {
            reference_lists: lists(&["M1", "M2"]),
            exclusion_lists: lists(&["X1"]),
            page_size: 100,
        };

        let pending = collect(&client, dir.path(), &args, &queue).await.unwrap();
        assert_eq!(pending.len(), 3);
        assert_eq!(
            queue.read().unwrap(),
            vec![Identifier::from("A"), Identifier::from("C"), Identifier::from("D")]
        );
        assert!(dir.path().join("M1_reference_profiles.csv").exists());
        assert!(dir.path().join("X1_exclusion_profiles.csv").exists());

        let report = delete(&client, &queue, Unpaced::default()).await.unwrap();
        assert_eq!(report.deleted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(queue.read().unwrap(), vec![Identifier::from("C")]);
    }

    #[tokio::test]
    async fn test_empty_reference_groups_send_no_deletions() {
        let server = MockServer::start().await;
        mount_list(&server, "X1", &["B"]).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let queue = SnapshotFile::new(dir.path().join("queue.csv"));
        let client = client_for(&server);
        let args = CollectArgs {
            reference_lists: Vec::new(),
            exclusion_lists: lists(&["X1"]),
            page_size: 100,
        };

        collect(&client, dir.path(), &args, &queue).await.unwrap();
        let report = delete(&client, &queue, Unpaced::default()).await.unwrap();

        assert_eq!(report, DriverReport::default());
        assert!(queue.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_collection_keeps_previous_queue() {
        let server = MockServer::start().await;
        mount_list(&server, "M1", &["A"]).await;
        Mock::given(method("GET"))
            .and(path("/api/lists/X1/profiles/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let queue = SnapshotFile::new(dir.path().join("queue.csv"));
        queue.write(&[Identifier::from("OLD")]).unwrap();
        let args = CollectArgs {
            reference_lists: lists(&["M1"]),
            exclusion_lists: lists(&["X1"]),
            page_size: 100,
        };

        let result = collect(&client_for(&server), dir.path(), &args, &queue).await;
        assert!(result.is_err());
        assert_eq!(queue.read().unwrap(), vec![Identifier::from("OLD")]);
        assert!(!dir.path().join("X1_exclusion_profiles.csv").exists());
    }

    #[tokio::test]
    async fn test_delete_without_queue() {
        let server = MockServer::start().await;
        let dir = tempdir().unwrap();
        let queue = SnapshotFile::new(dir.path().join("queue.csv"));

        let result = delete(&client_for(&server), &queue, Unpaced::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_wrong_base_url_keeps_queue() {
        let server = MockServer::start().await;
        mount_deletion(&server, "A", 202).await;

        let dir = tempdir().unwrap();
        let queue = SnapshotFile::new(dir.path().join("queue.csv"));
        let pending = vec![Identifier::from("A"), Identifier::from("B"), Identifier::from("C")];
        queue.write(&pending).unwrap();

        // Every request lands on an unrouted path and gets a bare 404.
        let client = KlaviyoClient::new(
            ClientConfig::new("pk_test").with_base_url(format!("{}/wrong-prefix", server.uri())),
        )
        .unwrap();
        let report = delete(&client, &queue, Unpaced::default()).await.unwrap();

        assert_eq!(report.failed, 3);
        assert_eq!(report.already_absent, 0);
        assert_eq!(report.deleted, 0);
        assert_eq!(queue.read().unwrap(), pending);
    }
}
