//! End-to-end publish/delete scenarios against the mock git host
//!
//! These drive the whole core pipeline through [`Publisher`]: export,
//! extraction, front matter, bundling, the atomic commit sequence, and the
//! publish record lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use notegit_config::RepositoryConfig;
use notegit_core::{
    BlobResolver, DocumentHost, PublishRecordStore, Publisher, RecordStorage, Severity,
};
use notegit_github::mock::MockGitHost;
use notegit_github::GitDataApi;

struct TestHost {
    title: String,
    text: String,
    notices: std::sync::Mutex<Vec<(String, Severity)>>,
}

impl TestHost {
    fn new(title: &str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            title: title.to_string(),
            text: text.to_string(),
            notices: std::sync::Mutex::new(Vec::new()),
        })
    }

    fn notices(&self) -> Vec<(String, Severity)> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentHost for TestHost {
    async fn document_text(&self, _document_id: &str) -> anyhow::Result<String> {
        Ok(self.text.clone())
    }

    async fn document_title(&self, _document_id: &str) -> anyhow::Result<String> {
        Ok(self.title.clone())
    }

    fn notify(&self, message: &str, severity: Severity, _duration_ms: u64) {
        self.notices
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}

struct TestResolver {
    blobs: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl BlobResolver for TestResolver {
    async fn resolve(
        &self,
        reference: &str,
        _document_id: &str,
    ) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(reference).cloned())
    }
}

#[derive(Default)]
struct MemoryStorage {
    data: RwLock<Option<String>>,
}

#[async_trait]
impl RecordStorage for MemoryStorage {
    async fn load(&self) -> anyhow::Result<Option<String>> {
        Ok(self.data.read().await.clone())
    }

    async fn save(&self, serialized: &str) -> anyhow::Result<()> {
        *self.data.write().await = Some(serialized.to_string());
        Ok(())
    }
}

fn config() -> RepositoryConfig {
    RepositoryConfig {
        username: "alice".to_string(),
        access_token: "ghp_secret".to_string(),
        repository: "alice/notes".to_string(),
        branch: "main".to_string(),
        base_path: "content/posts".to_string(),
        ..RepositoryConfig::default()
    }
}

async fn publisher_with(
    config: RepositoryConfig,
    host: Arc<TestHost>,
    blobs: &[(&str, &[u8])],
    api: Arc<MockGitHost>,
) -> (Publisher, Arc<PublishRecordStore>) {
    let resolver = Arc::new(TestResolver {
        blobs: blobs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect(),
    });
    let store = Arc::new(PublishRecordStore::open(Arc::new(MemoryStorage::default())).await);
    let publisher = Publisher::new(
        config,
        host,
        resolver,
        api as Arc<dyn GitDataApi>,
        Arc::clone(&store),
    );
    (publisher, store)
}

#[tokio::test]
async fn publish_lands_bundle_as_one_revision() {
    let api = Arc::new(MockGitHost::with_branch("main").await);
    let host = TestHost::new("My Note", "# Hi\n![x](local.png)");
    let (publisher, store) =
        publisher_with(config(), host, &[("local.png", &[1, 2, 3, 4])], Arc::clone(&api)).await;

    let outcome = publisher.publish("doc-1", None, None).await.unwrap();

    assert_eq!(outcome.folder_name, "My Note");
    assert_eq!(
        outcome.remote_document_url,
        "https://github.com/alice/notes/blob/main/content/posts/My Note/index.md"
    );
    assert_eq!(outcome.remote_published_url, None);

    assert_eq!(
        api.paths_at_head("main").await,
        vec![
            "content/posts/My Note/image1.png".to_string(),
            "content/posts/My Note/index.md".to_string(),
        ]
    );
    assert_eq!(
        api.blob_at_head("main", "content/posts/My Note/index.md")
            .await
            .as_deref(),
        Some("# Hi\n![x](image1.png)")
    );
    // base64 of the 4 bytes 0x01 0x02 0x03 0x04
    assert_eq!(
        api.blob_at_head("main", "content/posts/My Note/image1.png")
            .await
            .as_deref(),
        Some("AQIDBA==")
    );

    let record = store.lookup("doc-1").await.unwrap();
    assert_eq!(record.folder_name, "My Note");
    assert_eq!(record.repository_snapshot.base_path, "content/posts");
}

#[tokio::test]
async fn delete_after_publish_clears_folder_and_record() {
    let api = Arc::new(MockGitHost::with_branch("main").await);
    let host = TestHost::new("My Note", "# Hi\n![x](local.png)");
    let (publisher, store) =
        publisher_with(config(), host, &[("local.png", &[1, 2, 3, 4])], Arc::clone(&api)).await;

    publisher.publish("doc-1", None, None).await.unwrap();
    publisher.delete("doc-1").await.unwrap();

    assert!(api.paths_at_head("main").await.is_empty());
    assert!(store.lookup("doc-1").await.is_none());
}

#[tokio::test]
async fn delete_without_record_reports_not_published() {
    let api = Arc::new(MockGitHost::with_branch("main").await);
    let host = TestHost::new("T", "body");
    let (publisher, _) = publisher_with(config(), host, &[], Arc::clone(&api)).await;

    let err = publisher.delete("doc-never").await.unwrap_err();
    assert!(err.is_not_published());
    // No remote call may have been issued for a purely local miss.
    assert!(api.call_log().await.is_empty());
}

#[tokio::test]
async fn invalid_config_is_rejected_before_any_network_call() {
    let api = Arc::new(MockGitHost::with_branch("main").await);
    let host = TestHost::new("T", "body");
    let (publisher, _) = publisher_with(
        RepositoryConfig::default(),
        Arc::clone(&host),
        &[],
        Arc::clone(&api),
    )
    .await;

    publisher.publish("doc-1", None, None).await.unwrap_err();
    assert!(api.call_log().await.is_empty());

    publisher.delete("doc-1").await.unwrap_err();
    assert!(api.call_log().await.is_empty());

    // Both rejections still reach the user through the host notification.
    let notices = host.notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].1, Severity::Error);
    assert!(notices[0].0.starts_with("Publish failed:"), "got: {}", notices[0].0);
    assert_eq!(notices[1].1, Severity::Error);
    assert!(notices[1].0.starts_with("Delete failed:"), "got: {}", notices[1].0);
}

#[tokio::test]
async fn same_document_publishes_never_interleave() {
    let api = Arc::new(MockGitHost::with_branch("main").await);
    let root = api.branch_commit("main").await.unwrap();
    let host = TestHost::new("My Note", "# Hi");
    let (publisher, _) = publisher_with(config(), host, &[], Arc::clone(&api)).await;
    let publisher = Arc::new(publisher);

    let first = {
        let publisher = Arc::clone(&publisher);
        tokio::spawn(async move { publisher.publish("doc-1", None, None).await })
    };
    let second = {
        let publisher = Arc::clone(&publisher);
        tokio::spawn(async move { publisher.publish("doc-1", None, None).await })
    };
    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    // The per-document lock serializes the two engine sequences: the call
    // log is two complete blocks, never interleaved.
    let expected_block = [
        "branch_head",
        "tree_entries",
        "create_blob",
        "create_tree",
        "create_commit",
        "update_ref",
    ];
    let mut expected: Vec<&str> = Vec::new();
    expected.extend_from_slice(&expected_block);
    expected.extend_from_slice(&expected_block);
    assert_eq!(api.call_log().await, expected);

    // The later tree was built from the earlier attempt's commit, not the
    // original base.
    let head = api.branch_commit("main").await.unwrap();
    let (earlier, later) = if head == first.commit_sha {
        (second.commit_sha, first.commit_sha)
    } else {
        (first.commit_sha, second.commit_sha)
    };
    assert_eq!(api.commit_parent(&later).await, Some(earlier.clone()));
    assert_eq!(api.commit_parent(&earlier).await, Some(root));
}

#[tokio::test]
async fn custom_domain_yields_published_url() {
    let api = Arc::new(MockGitHost::with_branch("main").await);
    let host = TestHost::new("My Note", "# Hi");
    let mut cfg = config();
    cfg.custom_domain = "https://notes.example.com/".to_string();
    let (publisher, _) = publisher_with(cfg, host, &[], Arc::clone(&api)).await;

    let outcome = publisher.publish("doc-1", None, None).await.unwrap();
    assert_eq!(
        outcome.remote_published_url.as_deref(),
        Some("https://notes.example.com/My Note")
    );
}

#[tokio::test]
async fn explicit_folder_and_front_matter_override_are_used() {
    let api = Arc::new(MockGitHost::with_branch("main").await);
    let host = TestHost::new("My Note", "# Hi");
    let (publisher, _) = publisher_with(config(), host, &[], Arc::clone(&api)).await;

    let outcome = publisher
        .publish("doc-1", Some("renamed"), Some("title: <TITLE>"))
        .await
        .unwrap();
    assert_eq!(outcome.folder_name, "renamed");

    let index = api
        .blob_at_head("main", "content/posts/renamed/index.md")
        .await
        .unwrap();
    assert!(index.starts_with("---\ntitle: My Note\n"), "got: {index}");
    assert!(index.ends_with("# Hi"));
}

#[tokio::test]
async fn connection_test_probes_in_order() {
    let api = Arc::new(MockGitHost::with_branch("main").await);
    let host = TestHost::new("T", "body");
    let (publisher, _) = publisher_with(config(), host, &[], Arc::clone(&api)).await;

    publisher.test_connection().await.unwrap();
    assert_eq!(
        api.call_log().await,
        vec!["verify_auth", "verify_repo", "verify_branch"]
    );

    api.deny_auth().await;
    publisher.test_connection().await.unwrap_err();
}
