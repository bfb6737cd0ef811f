//! 证据图片上传服务
//!
//! 类型和大小在读取文件后、发出请求前校验

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::clients::{decode, RestApi, UploadFile};
use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::models::UploadedImage;

/// 允许的图片扩展名
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// 上传服务
pub struct UploadService {
    api: Arc<dyn RestApi>,
    max_bytes: u64,
}

impl UploadService {
    pub fn new(api: Arc<dyn RestApi>, config: &Config) -> Self {
        Self {
            api,
            max_bytes: config.max_upload_bytes,
        }
    }

    /// 从磁盘读取并上传图片
    pub async fn upload_image(&self, path: &Path) -> AppResult<UploadedImage> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // 先用文件元数据做校验，避免读取过大的文件
        let size = tokio::fs::metadata(path).await?.len();
        let mime_type = validate_image(&file_name, size, self.max_bytes)?;

        let bytes = tokio::fs::read(path).await?;
        self.upload_bytes(UploadFile {
            file_name,
            mime_type: mime_type.to_string(),
            bytes,
        })
        .await
    }

    /// 上传内存中的图片
    pub async fn upload_bytes(&self, file: UploadFile) -> AppResult<UploadedImage> {
        validate_image(&file.file_name, file.bytes.len() as u64, self.max_bytes)?;

        debug!("上传图片: {} ({} 字节)", file.file_name, file.bytes.len());
        let endpoint = "uploads";
        let uploaded: UploadedImage = decode(endpoint, self.api.upload(endpoint, file).await?)?;
        info!("✓ 图片已上传: {}", uploaded.path);
        Ok(uploaded)
    }
}

/// 校验图片扩展名和大小，返回对应的 MIME 类型
pub fn validate_image(file_name: &str, size: u64, max_bytes: u64) -> Result<&'static str, ValidationError> {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let mime = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => return Err(ValidationError::UnsupportedImageType { extension }),
    };

    if size > max_bytes {
        return Err(ValidationError::ImageTooLarge {
            size,
            limit: max_bytes,
        });
    }

    Ok(mime)
}
