pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const INFO: &str = "ℹ️";
    pub const KEY: &str = "🔑";
    pub const LINK: &str = "🔗";
    pub const DEL: &str = "🗑️";
    pub const DATABASE: &str = "🗄️";
}
