//! 评审文件写入服务 - 业务能力层
//!
//! 只负责"把一篇评审写成文件"能力，不关心流程

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, AppResult, PersistenceError};

/// 评审文件写入服务
///
/// 每次运行一个目录，每篇评审一个 `{序号:02}_{标题}.md` 文件
pub struct ReviewWriter {
    run_dir: PathBuf,
    max_title_len: usize,
}

impl ReviewWriter {
    pub fn new(run_dir: impl Into<PathBuf>, max_title_len: usize) -> Self {
        Self {
            run_dir: run_dir.into(),
            max_title_len,
        }
    }

    /// 在输出根目录下创建以当前时间命名的运行目录
    pub fn create_run_dir(output_root: &Path) -> AppResult<PathBuf> {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let run_dir = output_root.join(stamp);
        std::fs::create_dir_all(&run_dir).map_err(|source| PersistenceError::OutputDirFailed {
            path: run_dir.clone(),
            source,
        })?;
        Ok(run_dir)
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// 评审文件路径
    pub fn artifact_path(&self, seq: usize, title: &str) -> PathBuf {
        self.run_dir.join(artifact_file_name(seq, title, self.max_title_len))
    }

    /// 写入评审内容（原样写入）
    pub async fn write(&self, seq: usize, title: &str, content: &str) -> AppResult<PathBuf> {
        let path = self.artifact_path(seq, title);
        debug!("写入评审: {} ({} 字符)", path.display(), content.chars().count());

        tokio::fs::write(&path, content)
            .await
            .map_err(|source| AppError::artifact_write_failed(&path, source))?;
        Ok(path)
    }
}

/// 文件名中标题部分的字节上限，给序号前缀和扩展名留出余量（文件名上限 255 字节）
pub const MAX_TITLE_BYTES: usize = 200;

/// `{序号:02}_{安全标题}.md`
pub fn artifact_file_name(seq: usize, title: &str, max_title_len: usize) -> String {
    format!("{:02}_{}.md", seq, sanitize_title(title, max_title_len))
}

/// 只保留字母数字、空格、`-`、`_`，截断到 `max_len` 个字符且不超过
/// `MAX_TITLE_BYTES` 字节（在字符边界截断）
///
/// 结果为空时用 `untitled`
pub fn sanitize_title(title: &str, max_len: usize) -> String {
    let mut kept = String::new();
    for c in title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(max_len)
    {
        if kept.len() + c.len_utf8() > MAX_TITLE_BYTES {
            break;
        }
        kept.push(c);
    }
    let trimmed = kept.trim();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
