//! 已评审记录 - 业务能力层
//!
//! 只负责"记住哪些论文评审过"，不关心流程
//!
//! 记录文件格式：UTF-8 文本，每行一个标识符，空行和 `#` 开头的行忽略。
//! 只追加，不改写已有行。

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, AppResult, PersistenceError};
use crate::models::normalize_identifier;

/// 已评审论文集合
///
/// 内存集合与记录文件始终一致：`mark_reviewed` 先追加文件，成功后才写入内存
pub struct ReviewedStore {
    path: PathBuf,
    reviewed: HashSet<String>,
}

impl ReviewedStore {
    /// 从记录文件加载，文件不存在时为空集合
    pub fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let reviewed = Self::read_set(&path)?;
        debug!("已加载 {} 条已评审记录: {}", reviewed.len(), path.display());
        Ok(Self { path, reviewed })
    }

    /// 直接读取记录文件中的标识符集合，不需要 store 实例
    pub fn read_set(path: &Path) -> AppResult<HashSet<String>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => {
                return Err(PersistenceError::StoreReadFailed {
                    path: path.to_path_buf(),
                    source,
                }
                .into())
            }
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(normalize_identifier)
            .collect())
    }

    pub fn is_reviewed(&self, identifier: &str) -> bool {
        self.reviewed.contains(&normalize_identifier(identifier))
    }

    /// 标记为已评审
    ///
    /// 已存在时不做任何事并返回 `false`；否则追加一行到记录文件，
    /// 成功后加入内存集合并返回 `true`。追加失败时内存集合不变
    pub fn mark_reviewed(&mut self, identifier: &str) -> AppResult<bool> {
        let identifier = normalize_identifier(identifier);
        if identifier.is_empty() || self.reviewed.contains(&identifier) {
            return Ok(false);
        }

        self.append_line(&identifier)
            .map_err(|source| AppError::store_append_failed(&self.path, source))?;
        self.reviewed.insert(identifier);
        Ok(true)
    }

    pub fn count(&self) -> usize {
        self.reviewed.len()
    }

    pub fn reviewed(&self) -> &HashSet<String> {
        &self.reviewed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, identifier: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        // 旧文件末尾没有换行时先补一个，避免和上一行粘在一起
        let mut line = String::with_capacity(identifier.len() + 2);
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                line.push('\n');
            }
        }
        line.push_str(identifier);
        line.push('\n');

        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }
}
