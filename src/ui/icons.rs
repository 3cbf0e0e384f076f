pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const DEL: &str = "🗑️";
    pub const PACKAGE: &str = "📦";
    pub const BUCKET: &str = "🪣";
    pub const STAR: &str = "⭐";
}

/// Icon shown next to a phase heading
pub fn phase_icon(phase: crate::queries::Phase) -> &'static str {
    use crate::queries::Phase;
    match phase {
        Phase::Drop => Icons::DEL,
        Phase::Create => Icons::PACKAGE,
        Phase::Copy => Icons::BUCKET,
        Phase::Insert => Icons::STAR,
    }
}
