// ==========================================
// 地铁车队入段排程系统 - 领域类型定义
// ==========================================
// 依据: 入段优先级分档约定 (70/40 分界)
// 依据: 车辆状态 / 适用证书 / 模拟场景枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 高优先级分界（含）
///
/// 红线: 分档阈值是对外契约（配色、筛选依赖），不可配置
pub const HIGH_PRIORITY_THRESHOLD: f64 = 70.0;

/// 中优先级分界（含）
pub const MEDIUM_PRIORITY_THRESHOLD: f64 = 40.0;

/// 影响分级: 变动比例 ≤ 10% 为 Minimal
pub const MINIMAL_IMPACT_MAX_RATIO: f64 = 0.10;

/// 影响分级: 变动比例 ≤ 40% 为 Moderate，以上为 Severe
pub const MODERATE_IMPACT_MAX_RATIO: f64 = 0.40;

/// 归一化枚举字符串: 去掉空格/下划线/连字符并转大写
///
/// "In Service" / "in_service" / "InService" 均归一为 "INSERVICE"
fn normalize_token(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

// ==========================================
// 车辆状态 (Train Status)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainStatus {
    Available,   // 可用
    InService,   // 运营中
    Maintenance, // 检修中
    OutOfOrder,  // 故障停用
}

impl fmt::Display for TrainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainStatus::Available => write!(f, "AVAILABLE"),
            TrainStatus::InService => write!(f, "IN_SERVICE"),
            TrainStatus::Maintenance => write!(f, "MAINTENANCE"),
            TrainStatus::OutOfOrder => write!(f, "OUT_OF_ORDER"),
        }
    }
}

impl std::str::FromStr for TrainStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "AVAILABLE" => Ok(TrainStatus::Available),
            "INSERVICE" => Ok(TrainStatus::InService),
            "MAINTENANCE" => Ok(TrainStatus::Maintenance),
            "OUTOFORDER" => Ok(TrainStatus::OutOfOrder),
            _ => Err(format!("未知车辆状态: {}", s)),
        }
    }
}

// ==========================================
// 适用证书状态 (Fitness Certificate Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Valid,       // 有效
    UnderReview, // 复核中
    Expired,     // 已过期
}

impl CertificateStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, CertificateStatus::Valid)
    }

    /// 面向运营人员的展示文本
    pub fn label(&self) -> &'static str {
        match self {
            CertificateStatus::Valid => "Valid",
            CertificateStatus::UnderReview => "Under Review",
            CertificateStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateStatus::Valid => write!(f, "VALID"),
            CertificateStatus::UnderReview => write!(f, "UNDER_REVIEW"),
            CertificateStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

impl std::str::FromStr for CertificateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "VALID" => Ok(CertificateStatus::Valid),
            "UNDERREVIEW" => Ok(CertificateStatus::UnderReview),
            "EXPIRED" => Ok(CertificateStatus::Expired),
            _ => Err(format!("未知证书状态: {}", s)),
        }
    }
}

// ==========================================
// 优先级分档 (Priority Tier)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityTier {
    Low,    // 低
    Medium, // 中
    High,   // 高
}

impl PriorityTier {
    /// 按固定阈值由分数推导分档
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_PRIORITY_THRESHOLD {
            PriorityTier::High
        } else if score >= MEDIUM_PRIORITY_THRESHOLD {
            PriorityTier::Medium
        } else {
            PriorityTier::Low
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityTier::Low => write!(f, "LOW"),
            PriorityTier::Medium => write!(f, "MEDIUM"),
            PriorityTier::High => write!(f, "HIGH"),
        }
    }
}

// ==========================================
// 评分因子 (Score Factor)
// ==========================================
// 用途: 入段理由的排序与展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreFactor {
    Mileage,           // 里程压力
    Health,            // 健康度缺口
    MaintenanceWindow, // 检修窗口紧迫度
    Certificate,       // 证书惩罚
    Anomalies,         // 传感器异常
    Branding,          // 广告合同加权（仅场景模拟）
}

impl ScoreFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreFactor::Mileage => "mileage",
            ScoreFactor::Health => "health",
            ScoreFactor::MaintenanceWindow => "maintenance_window",
            ScoreFactor::Certificate => "certificate",
            ScoreFactor::Anomalies => "anomalies",
            ScoreFactor::Branding => "branding",
        }
    }
}

impl fmt::Display for ScoreFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 模拟场景类型 (Scenario Kind)
// ==========================================
// 序列化格式: snake_case (与前端请求一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    TrainReplacement, // 换车/故障
    BrandingPriority, // 广告合同优先
    MileageBalancing, // 里程均衡
    ShuntingCost,     // 调车成本
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::TrainReplacement => "train_replacement",
            ScenarioKind::BrandingPriority => "branding_priority",
            ScenarioKind::MileageBalancing => "mileage_balancing",
            ScenarioKind::ShuntingCost => "shunting_cost",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            ScenarioKind::TrainReplacement => "换车模拟",
            ScenarioKind::BrandingPriority => "广告优先",
            ScenarioKind::MileageBalancing => "里程均衡",
            ScenarioKind::ShuntingCost => "调车成本",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "TRAINREPLACEMENT" => Ok(ScenarioKind::TrainReplacement),
            "BRANDINGPRIORITY" => Ok(ScenarioKind::BrandingPriority),
            "MILEAGEBALANCING" => Ok(ScenarioKind::MileageBalancing),
            "SHUNTINGCOST" => Ok(ScenarioKind::ShuntingCost),
            _ => Err(format!("未知场景类型: {}", s)),
        }
    }
}

// ==========================================
// 影响等级 (Impact Level)
// ==========================================
// 顺序: Minimal < Moderate < Severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImpactLevel {
    Minimal,
    Moderate,
    Severe,
}

impl ImpactLevel {
    /// 按变动比例分级（边界值归入较轻一档）
    pub fn from_changed_ratio(ratio: f64) -> Self {
        if ratio <= MINIMAL_IMPACT_MAX_RATIO {
            ImpactLevel::Minimal
        } else if ratio <= MODERATE_IMPACT_MAX_RATIO {
            ImpactLevel::Moderate
        } else {
            ImpactLevel::Severe
        }
    }
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpactLevel::Minimal => write!(f, "Minimal"),
            ImpactLevel::Moderate => write!(f, "Moderate"),
            ImpactLevel::Severe => write!(f, "Severe"),
        }
    }
}

// ==========================================
// 计划变动类型 (Change Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,        // 新进入计划
    Removed,      // 被移出计划
    SlotMoved,    // 时段变化
    DepotChanged, // 车辆段变化
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Added => write!(f, "added"),
            ChangeType::Removed => write!(f, "removed"),
            ChangeType::SlotMoved => write!(f, "slot_moved"),
            ChangeType::DepotChanged => write!(f, "depot_changed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds_are_inclusive() {
        assert_eq!(PriorityTier::from_score(70.0), PriorityTier::High);
        assert_eq!(PriorityTier::from_score(69.9), PriorityTier::Medium);
        assert_eq!(PriorityTier::from_score(40.0), PriorityTier::Medium);
        assert_eq!(PriorityTier::from_score(39.9), PriorityTier::Low);
        assert_eq!(PriorityTier::from_score(0.0), PriorityTier::Low);
        assert_eq!(PriorityTier::from_score(100.0), PriorityTier::High);
    }

    #[test]
    fn test_impact_level_boundaries() {
        assert_eq!(ImpactLevel::from_changed_ratio(0.0), ImpactLevel::Minimal);
        assert_eq!(ImpactLevel::from_changed_ratio(0.10), ImpactLevel::Minimal);
        assert_eq!(ImpactLevel::from_changed_ratio(0.11), ImpactLevel::Moderate);
        assert_eq!(ImpactLevel::from_changed_ratio(0.40), ImpactLevel::Moderate);
        assert_eq!(ImpactLevel::from_changed_ratio(0.41), ImpactLevel::Severe);
    }

    #[test]
    fn test_status_parsing_accepts_display_variants() {
        assert_eq!("In Service".parse::<TrainStatus>().unwrap(), TrainStatus::InService);
        assert_eq!("IN_SERVICE".parse::<TrainStatus>().unwrap(), TrainStatus::InService);
        assert_eq!("out-of-order".parse::<TrainStatus>().unwrap(), TrainStatus::OutOfOrder);
        assert!("Scrapped".parse::<TrainStatus>().is_err());

        assert_eq!(
            "Under Review".parse::<CertificateStatus>().unwrap(),
            CertificateStatus::UnderReview
        );
    }

    #[test]
    fn test_scenario_kind_parsing() {
        assert_eq!(
            "train_replacement".parse::<ScenarioKind>().unwrap(),
            ScenarioKind::TrainReplacement
        );
        assert_eq!(
            "ShuntingCost".parse::<ScenarioKind>().unwrap(),
            ScenarioKind::ShuntingCost
        );
        assert!("weather_delay".parse::<ScenarioKind>().is_err());
    }
}
