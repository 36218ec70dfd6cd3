// ==========================================
// 地铁车队入段排程系统 - 历史台账 Trait
// ==========================================
// 职责: 定义计划快照的追加与查询接口
// 红线: 只追加，不提供更新/删除
// ==========================================

use crate::domain::induction::PlanSnapshot;
use crate::repository::error::RepositoryResult;

/// 历史查询默认条数
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

// ==========================================
// HistoryLedger Trait
// ==========================================
// 实现者: SqliteHistoryLedger
pub trait HistoryLedger: Send + Sync {
    /// 追加计划快照
    fn append(&self, snapshot: &PlanSnapshot) -> RepositoryResult<()>;

    /// 最近 limit 条快照（按生成时间倒序）
    fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<PlanSnapshot>>;
}
