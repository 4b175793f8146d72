use crate::domain::model::Quote;
use crate::domain::ports::Renderer;

/// 終端機顯示
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn render_quote(&self, quote: &Quote) {
        println!("\n  \"{}\"\n    Category: {}\n", quote.text, quote.category);
    }

    fn render_empty(&self, category: &str) {
        println!("\n  No quotes available in category \"{}\".\n", category);
    }

    fn notify(&self, message: &str) {
        println!("🔔 {}", message);
    }
}
