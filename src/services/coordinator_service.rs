//! 协调员账户服务（管理员使用）

use std::sync::Arc;

use tracing::info;

use crate::clients::{decode, decode_list, encode, RestApi};
use crate::error::AppResult;
use crate::models::{Coordinator, CoordinatorId, NewAccount};

pub struct CoordinatorService {
    api: Arc<dyn RestApi>,
}

impl CoordinatorService {
    pub fn new(api: Arc<dyn RestApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> AppResult<Vec<Coordinator>> {
        let endpoint = "coordinadores";
        decode_list(endpoint, self.api.get(endpoint).await?)
    }

    pub async fn create(&self, account: &NewAccount) -> AppResult<Coordinator> {
        account.validate()?;
        let endpoint = "coordinadores";
        let created: Coordinator =
            decode(endpoint, self.api.post(endpoint, &encode(endpoint, account)?).await?)?;
        info!("✓ 协调员已创建: {} ({})", created.name, created.email);
        Ok(created)
    }

    pub async fn delete(&self, id: CoordinatorId) -> AppResult<()> {
        let endpoint = format!("coordinadores/{}", id);
        self.api.delete(&endpoint).await?;
        info!("✓ 协调员 {} 已删除", id);
        Ok(())
    }
}
