use crate::config::EmitterConfig;
use anyhow::Result;
use colored::Colorize;
use std::io::Write;

pub type EmitResult = Result<()>;

#[derive(Debug, Clone)]
pub struct EmitContext {
    pub indent_level: usize,
    pub indent_chars: String,
    pub use_colors: bool,
}

impl EmitContext {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_chars: "    ".to_string(),
            use_colors: true,
        }
    }

    pub fn from_config(config: &EmitterConfig) -> Self {
        Self {
            indent_level: 0,
            indent_chars: config.indent_style.as_indent(),
            use_colors: config.use_colors,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    pub fn get_indent(&self) -> String {
        self.indent_chars.repeat(self.indent_level)
    }

    pub fn nested(&self) -> Self {
        let mut ctx = self.clone();
        ctx.indent();
        ctx
    }
}

impl Default for EmitContext {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Emitter {
    type Item;

    fn config(&self) -> &EmitterConfig;

    fn emit<W: Write>(
        &self,
        item: &Self::Item,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult;

    fn emit_to_string(&self, item: &Self::Item) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = EmitContext::from_config(self.config());
        self.emit(item, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Keyword,
    Header,
    Comment,
    Added,
    Removed,
}

pub struct EmitHelper;

impl EmitHelper {
    pub fn write_line<W: Write>(writer: &mut W, context: &EmitContext, text: &str) -> EmitResult {
        writeln!(writer, "{}{}", context.get_indent(), text)?;
        Ok(())
    }

    pub fn styled(context: &EmitContext, text: &str, style: Style) -> String {
        if !context.use_colors {
            return text.to_string();
        }
        match style {
            Style::Keyword => text.blue().to_string(),
            Style::Header => text.cyan().bold().to_string(),
            Style::Comment => text.green().to_string(),
            Style::Added => text.bright_green().to_string(),
            Style::Removed => text.bright_red().to_string(),
        }
    }

    pub fn write_styled_line<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        text: &str,
        style: Style,
    ) -> EmitResult {
        let text = Self::styled(context, text, style);
        Self::write_line(writer, context, &text)
    }

    pub fn write_comment<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        comment: &str,
    ) -> EmitResult {
        Self::write_styled_line(writer, context, &format!("// {}", comment), Style::Comment)
    }

    pub fn write_section<W: Write>(
        writer: &mut W,
        context: &EmitContext,
        title: &str,
    ) -> EmitResult {
        Self::write_styled_line(writer, context, &section_header(title), Style::Header)
    }

    pub fn write_block<W: Write, F>(
        writer: &mut W,
        context: &mut EmitContext,
        header: &str,
        body: F,
    ) -> EmitResult
    where
        F: FnOnce(&mut W, &mut EmitContext) -> EmitResult,
    {
        Self::write_line(writer, context, &format!("{} {{", header))?;
        context.indent();
        body(writer, context)?;
        context.dedent();
        Self::write_line(writer, context, "}")?;
        Ok(())
    }
}

const SECTION_RULE: &str = "--------------------";

pub fn section_header(title: &str) -> String {
    format!("{} {} {}", SECTION_RULE, title, SECTION_RULE)
}

// Inverse of `section_header`.
pub fn parse_section_header(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix(SECTION_RULE)?
        .strip_suffix(SECTION_RULE)
        .map(str::trim)
}
