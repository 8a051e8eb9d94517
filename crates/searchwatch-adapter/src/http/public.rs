/*
[INPUT]:  None beyond the API root
[OUTPUT]: Task templates and public capacity stats
[POS]:    HTTP layer - catalogue endpoints
[UPDATE]: When adding new public endpoints or changing response format
*/

use crate::http::{Result, SearchwatchClient};
use crate::types::{PublicStats, TaskTemplate};
use reqwest::Method;

impl SearchwatchClient {
    /// Task presets offered by the wizard
    ///
    /// GET /templates
    pub async fn list_templates(&self) -> Result<Vec<TaskTemplate>> {
        let builder = if self.credentials().is_some() {
            self.authed_request(Method::GET, &["templates"])?
        } else {
            self.public_request(Method::GET, &["templates"])?
        };
        self.send_json(builder).await
    }

    /// Capacity and slot count used for signup gating
    ///
    /// GET /public/stats
    pub async fn public_stats(&self) -> Result<PublicStats> {
        let builder = self.public_request(Method::GET, &["public", "stats"])?;
        self.send_json(builder).await
    }
}
