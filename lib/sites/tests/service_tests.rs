use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use generator::{ContentGenerator, GeneratorResult};
use hosting::memory::InMemoryHosting;
use hosting::{
    DeployOptions, HostingApi, HostingError, PublicationState, SiteName, ValidationError,
};
use sites::{Approval, SiteError, SiteService, SiteStore};
use testing::fixtures::write_files;

/// Renders the instruction history into a page and remembers every history it was given.
#[derive(Default)]
struct EchoGenerator {
    seen: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl ContentGenerator for EchoGenerator {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn generate(&self, instructions: &[String]) -> GeneratorResult<String> {
        self.seen.lock().unwrap().push(instructions.to_vec());
        Ok(format!(
            "<!DOCTYPE html><html><body>{}</body></html>",
            instructions.join(" | ")
        ))
    }
}

struct Fixture {
    hosting: Arc<InMemoryHosting>,
    generator: Arc<EchoGenerator>,
    service: Arc<SiteService>,
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let hosting = Arc::new(InMemoryHosting::new());
        let generator = Arc::new(EchoGenerator::default());
        let service = SiteService::new(
            hosting.clone(),
            generator.clone(),
            SiteStore::open(dir.path().join("data/sites.json")),
            dir.path().join("sites"),
            DeployOptions::default(),
        );

        Self {
            hosting,
            generator,
            service: Arc::new(service),
            dir,
        }
    }

    fn reopened_store(&self) -> SiteStore {
        SiteStore::open(self.dir.path().join("data/sites.json"))
    }
}

#[tokio::test]
async fn two_instructions_build_on_each_other() {
    let fixture = Fixture::new();
    let site_dir = fixture
        .service
        .site_dir(&SiteName::parse("demo-site").unwrap());
    write_files(&site_dir, &[("css/site.css", "body { color: #333; }")]);

    let first = fixture
        .service
        .submit_instruction("demo-site", "A landing page for a bakery")
        .await
        .unwrap();
    let second = fixture
        .service
        .submit_instruction("demo-site", "Make the header blue")
        .await
        .unwrap();

    assert_eq!(first.site_id, second.site_id);
    assert_eq!(vec!["demo-site".to_string()], fixture.hosting.calls().create_site);
    assert_eq!(
        vec![
            vec!["A landing page for a bakery".to_string()],
            vec![
                "A landing page for a bakery".to_string(),
                "Make the header blue".to_string()
            ],
        ],
        *fixture.generator.seen.lock().unwrap()
    );
    assert_eq!(
        vec!["css/site.css".to_string(), "index.html".to_string()],
        first.deploy.uploaded
    );
    // the stylesheet did not change so only the regenerated page is sent
    assert_eq!(vec!["index.html".to_string()], second.deploy.uploaded);
    let manifest = fixture.hosting.calls().create_deploy.last().cloned().unwrap();
    assert_eq!(
        vec!["css/site.css", "index.html"],
        manifest.keys().map(String::as_str).collect::<Vec<_>>()
    );

    let record = fixture.reopened_store().get("demo-site").unwrap().unwrap();
    assert_eq!(2, record.prompts.len());
    assert_eq!(second.deploy_url, record.deploy_url);

    let page = std::fs::read_to_string(fixture.dir.path().join("sites/demo-site/index.html")).unwrap();
    assert!(page.contains("A landing page for a bakery | Make the header blue"));
}

#[tokio::test]
async fn invalid_domain_never_reaches_provider() {
    let fixture = Fixture::new();
    fixture
        .service
        .submit_instruction("demo-site", "A blog")
        .await
        .unwrap();
    let calls_before = fixture.hosting.calls().total();

    let result = fixture.service.add_domain("demo-site", "notadomain").await;

    assert!(matches!(
        result,
        Err(SiteError::Validation(ValidationError::InvalidDomain(_)))
    ));
    assert_eq!(calls_before, fixture.hosting.calls().total());
}

#[tokio::test]
async fn domain_attached_and_primary() {
    let fixture = Fixture::new();
    let site = fixture
        .service
        .submit_instruction("demo-site", "A blog")
        .await
        .unwrap();

    let domain = fixture
        .service
        .add_domain("demo-site", "example.com")
        .await
        .unwrap();

    assert_eq!("example.com", domain.as_str());
    let remote = fixture.hosting.site(&site.site_id).unwrap();
    assert_eq!(Some("example.com".to_string()), remote.custom_domain);
}

#[tokio::test]
async fn domain_is_case_insensitive() {
    let fixture = Fixture::new();
    let site = fixture
        .service
        .submit_instruction("demo-site", "A blog")
        .await
        .unwrap();

    let domain = fixture
        .service
        .add_domain("demo-site", " Example.com ")
        .await
        .unwrap();

    assert_eq!("example.com", domain.as_str());
    assert_eq!(
        vec!["example.com".to_string()],
        fixture.hosting.calls().add_domain
    );
    assert_eq!(
        Some("example.com".to_string()),
        fixture.hosting.site(&site.site_id).unwrap().custom_domain
    );
}

#[tokio::test]
async fn check_name_reports_every_source() {
    let fixture = Fixture::new();

    let invalid = fixture.service.check_name("bad name!").await.unwrap();
    assert!(!invalid.exists);
    assert!(invalid.message.contains("bad name!"));

    let available = fixture.service.check_name("fresh").await.unwrap();
    assert!(!available.exists);

    fixture.hosting.create_site("remote-only").await.unwrap();
    let remote = fixture.service.check_name("Remote-Only").await.unwrap();
    assert!(remote.exists);
    assert!(remote.site_id.is_some());
    assert_eq!(None, remote.prompts);

    fixture
        .service
        .submit_instruction("demo-site", "A blog")
        .await
        .unwrap();
    let list_calls = fixture.hosting.calls().list_sites;
    let local = fixture.service.check_name(" demo-site ").await.unwrap();
    assert!(local.exists);
    assert_eq!(Some(vec!["A blog".to_string()]), local.prompts);
    assert_eq!(list_calls, fixture.hosting.calls().list_sites);
}

#[tokio::test]
async fn approval_publishes_to_production() {
    let fixture = Fixture::new();
    fixture
        .service
        .submit_instruction("demo-site", "A blog")
        .await
        .unwrap();

    let approval = fixture.service.approve("demo-site", true).await.unwrap();

    assert_eq!(
        Approval::Approved {
            deploy_url: "https://demo-site.netlify.app".to_string(),
            state: PublicationState::Production,
        },
        approval
    );
    assert_eq!(
        "https://demo-site.netlify.app",
        fixture.service.status("demo-site").await.unwrap().deploy_url
    );
}

#[tokio::test]
async fn declining_approval_changes_nothing() {
    let fixture = Fixture::new();
    fixture
        .service
        .submit_instruction("demo-site", "A blog")
        .await
        .unwrap();
    let calls_before = fixture.hosting.calls();

    let approval = fixture.service.approve("demo-site", false).await.unwrap();

    assert_eq!(Approval::Continue, approval);
    assert_eq!(calls_before, fixture.hosting.calls());
}

#[tokio::test]
async fn unknown_site_operations() {
    let fixture = Fixture::new();

    assert!(matches!(
        fixture.service.approve("nobody", true).await,
        Err(SiteError::UnknownSite(_))
    ));
    assert!(matches!(
        fixture.service.status("nobody").await,
        Err(SiteError::UnknownSite(_))
    ));
    assert!(matches!(
        fixture.service.reset_content("nobody").await,
        Err(SiteError::UnknownSite(_))
    ));
    assert_eq!(0, fixture.hosting.calls().total());
}

#[tokio::test]
async fn reset_clears_history() {
    let fixture = Fixture::new();
    fixture
        .service
        .submit_instruction("demo-site", "A blog")
        .await
        .unwrap();

    let reset = fixture.service.reset_content("demo-site").await.unwrap();

    assert_eq!(vec!["index.html".to_string()], reset.deploy.uploaded);
    let status = fixture.service.status("demo-site").await.unwrap();
    assert_eq!(0, status.prompts_count);

    fixture
        .service
        .submit_instruction("demo-site", "A shop")
        .await
        .unwrap();
    assert_eq!(
        vec!["A shop".to_string()],
        *fixture.generator.seen.lock().unwrap().last().unwrap()
    );
}

#[tokio::test]
async fn taken_name_is_reported() {
    let fixture = Fixture::new();
    fixture.hosting.claim_name_elsewhere("taken");

    let result = fixture.service.submit_instruction("taken", "A blog").await;

    assert!(matches!(
        result,
        Err(SiteError::Hosting(HostingError::NameTaken(_)))
    ));
    assert!(fixture.service.list_sites().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_input_is_rejected() {
    let fixture = Fixture::new();

    assert!(matches!(
        fixture.service.submit_instruction("demo-site", "   ").await,
        Err(SiteError::EmptyInstruction)
    ));
    assert!(matches!(
        fixture.service.submit_instruction("  ", "A blog").await,
        Err(SiteError::Validation(ValidationError::EmptySiteName))
    ));
    assert_eq!(0, fixture.hosting.calls().total());
}

#[tokio::test]
async fn deploy_existing_directory() {
    let fixture = Fixture::new();
    let content = tempfile::tempdir().unwrap();
    write_files(
        content.path(),
        &[("index.html", "<h1>hi</h1>"), ("assets/app.js", "console.log(1)")],
    );

    let site = fixture
        .service
        .deploy_directory("docs", content.path())
        .await
        .unwrap();

    assert_eq!(2, site.deploy.uploaded.len());
    let record = fixture.reopened_store().get("docs").unwrap().unwrap();
    assert_eq!(site.site_id, record.site_id);
    assert!(record.prompts.is_empty());
}

#[tokio::test]
async fn concurrent_requests_for_one_site_serialize() {
    let fixture = Fixture::new();

    let a = {
        let service = fixture.service.clone();
        tokio::spawn(async move { service.submit_instruction("demo-site", "first").await })
    };
    let b = {
        let service = fixture.service.clone();
        tokio::spawn(async move { service.submit_instruction("demo-site", "second").await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(1, fixture.hosting.calls().create_site.len());
    let record = fixture.reopened_store().get("demo-site").unwrap().unwrap();
    assert_eq!(2, record.prompts.len());
}
