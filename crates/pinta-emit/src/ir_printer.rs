use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter, Style};
use pinta_core::format::{format_method, format_stmt};
use pinta_core::{Class, Method, Program};
use std::io::Write;

// Prints a program in the `.pir` syntax the parser reads.
pub struct IrPrinter {
    config: EmitterConfig,
}

impl IrPrinter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn plain() -> Self {
        Self::new(EmitterConfig::plain())
    }

    fn class_header(&self, program: &Program, class: &Class, context: &EmitContext) -> String {
        let mut words = Vec::new();
        if !class.is_application {
            words.push(EmitHelper::styled(context, "library", Style::Keyword));
        }
        if class.is_interface {
            words.push(EmitHelper::styled(context, "interface", Style::Keyword));
        } else {
            if class.is_abstract {
                words.push(EmitHelper::styled(context, "abstract", Style::Keyword));
            }
            words.push(EmitHelper::styled(context, "class", Style::Keyword));
        }
        words.push(class.name.clone());

        let names = |ids: &[pinta_core::ClassId]| -> String {
            ids.iter()
                .map(|id| program.class(*id).name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        if class.is_interface {
            if !class.interfaces.is_empty() {
                words.push(format!("extends {}", names(&class.interfaces)));
            }
        } else {
            if let Some(super_class) = class.super_class {
                words.push(format!("extends {}", program.class(super_class).name));
            }
            if !class.interfaces.is_empty() {
                words.push(format!("implements {}", names(&class.interfaces)));
            }
        }
        words.join(" ")
    }

    fn method_header(&self, program: &Program, method: &Method, context: &EmitContext) -> String {
        let mut words = Vec::new();
        if method.is_static {
            words.push(EmitHelper::styled(context, "static", Style::Keyword));
        }
        if method.is_abstract {
            words.push(EmitHelper::styled(context, "abstract", Style::Keyword));
        }
        if method.is_native {
            words.push(EmitHelper::styled(context, "native", Style::Keyword));
        }
        words.push(EmitHelper::styled(context, "method", Style::Keyword));

        let params: Vec<String> = method
            .param_types
            .iter()
            .enumerate()
            .map(|(i, ty)| {
                let name = method
                    .ir
                    .as_ref()
                    .and_then(|ir| ir.param(i))
                    .map(|var| program.var(var).name.clone())
                    .unwrap_or_else(|| format!("p{}", i));
                format!("{}: {}", name, program.type_name(ty))
            })
            .collect();
        words.push(format!(
            "{}({}): {}",
            method.name,
            params.join(", "),
            program.type_name(&method.return_type)
        ));
        words.join(" ")
    }

    fn emit_class<W: Write>(
        &self,
        program: &Program,
        class: &Class,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let header = self.class_header(program, class, context);
        EmitHelper::write_block(writer, context, &header, |w, c| {
            for field in &class.fields {
                let field = program.field(*field);
                let modifier = if field.is_static { "static " } else { "" };
                EmitHelper::write_line(
                    w,
                    c,
                    &format!(
                        "{}field {}: {};",
                        modifier,
                        field.name,
                        program.type_name(&field.ty)
                    ),
                )?;
            }
            for (i, method) in class.method_ids().enumerate() {
                if i > 0 || !class.fields.is_empty() {
                    writeln!(w)?;
                }
                self.emit_method(program, program.method(method), w, c)?;
            }
            Ok(())
        })
    }

    fn emit_method<W: Write>(
        &self,
        program: &Program,
        method: &Method,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        if self.config.verbosity.should_print_ids() {
            EmitHelper::write_comment(
                writer,
                context,
                &format!("{} {}", method.id, format_method(program, method.id)),
            )?;
        }
        let header = self.method_header(program, method, context);
        match &method.ir {
            Some(ir) => EmitHelper::write_block(writer, context, &header, |w, c| {
                for stmt in &ir.stmts {
                    EmitHelper::write_line(w, c, &format!("{};", format_stmt(program, stmt)))?;
                }
                Ok(())
            }),
            None => EmitHelper::write_line(writer, context, &format!("{};", header)),
        }
    }
}

impl Default for IrPrinter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

impl Emitter for IrPrinter {
    type Item = Program;

    fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn emit<W: Write>(
        &self,
        program: &Program,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        for (i, class) in program.classes().iter().enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }
            self.emit_class(program, class, writer, context)?;
        }
        writeln!(writer)?;
        let entry = EmitHelper::styled(context, "entry", Style::Keyword);
        EmitHelper::write_line(
            writer,
            context,
            &format!("{} {};", entry, format_method(program, program.entry())),
        )
    }
}
