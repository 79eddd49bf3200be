use async_trait::async_trait;
use mockall::mock;

use crate::sheets::SheetSource;

// Mock sheet source for testing sync flows without network access
mock! {
    pub SheetSource {}

    #[async_trait]
    impl SheetSource for SheetSource {
        async fn fetch_csv(&self, link: &str) -> eyre::Result<String>;
    }
}
