use super::{MethodBuilder, ProgramBuilder};
use crate::class::ClassId;

pub struct ClassBuilder<'a> {
    class: ClassId,
    builder: &'a mut ProgramBuilder,
}

impl<'a> ClassBuilder<'a> {
    pub(crate) fn new(class: ClassId, builder: &'a mut ProgramBuilder) -> Self {
        Self { class, builder }
    }

    pub fn id(&self) -> ClassId {
        self.class
    }

    pub fn extends(&mut self, super_class: &str) -> &mut Self {
        let super_id = self.builder.class_ref(super_class);
        self.builder.class_data_mut(self.class).super_class = Some(super_id);
        self
    }

    pub fn implements(&mut self, iface: &str) -> &mut Self {
        let iface_id = self.builder.class_ref(iface);
        let class = self.builder.class_data_mut(self.class);
        if !class.interfaces.contains(&iface_id) {
            class.interfaces.push(iface_id);
        }
        self
    }

    pub fn interface(&mut self) -> &mut Self {
        let class = self.builder.class_data_mut(self.class);
        class.is_interface = true;
        class.is_abstract = true;
        self
    }

    pub fn abstract_(&mut self) -> &mut Self {
        self.builder.class_data_mut(self.class).is_abstract = true;
        self
    }

    // Library classes take part in the analysis but are left out of application-only reports.
    pub fn library(&mut self) -> &mut Self {
        self.builder.class_data_mut(self.class).is_application = false;
        self
    }

    pub fn field(&mut self, name: &str, ty: &str) -> &mut Self {
        self.builder.add_field(self.class, name, ty, false);
        self
    }

    pub fn static_field(&mut self, name: &str, ty: &str) -> &mut Self {
        self.builder.add_field(self.class, name, ty, true);
        self
    }

    pub fn method(&mut self, name: &str) -> MethodBuilder<'_> {
        MethodBuilder::new(self.class, name, self.builder)
    }

    pub fn builder(&mut self) -> &mut ProgramBuilder {
        &mut *self.builder
    }
}
