//! `Dictionary`: a string-keyed value store any host class can inherit.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use rill_value::{
    root_instance_method, CallContext, ClassDescriptor, EvalResult, MethodSignature,
    ScriptObject, TypeMask, Value, OBJECT_CLASS,
};
use rustc_hash::FxHashMap;

use crate::context::{HostContext, HostFlag};

pub static DICTIONARY_CLASS: ClassDescriptor = ClassDescriptor::new(
    "Dictionary",
    Some(&OBJECT_CLASS),
    Vec::new,
    dictionary_methods,
);

fn dictionary_methods() -> Vec<MethodSignature> {
    let key = TypeMask::STRING.singleton();
    vec![
        MethodSignature::instance("getValue", TypeMask::ANY).arg("key", key),
        MethodSignature::instance("setValue", TypeMask::NULL)
            .arg("key", key)
            .arg("value", TypeMask::ANY),
    ]
}

/// Entries of one dictionary; embedded by every subclass.
#[derive(Debug, Default)]
pub(crate) struct Entries(Mutex<FxHashMap<String, Value>>);

impl Entries {
    /// Handle `getValue`/`setValue`; `None` for any other method.
    pub(crate) fn execute(&self, context: &HostContext, method: &str, args: &[Value]) -> Option<EvalResult> {
        match method {
            "getValue" => Some(self.get_value(args)),
            "setValue" => Some(self.set_value(context, args)),
            _ => None,
        }
    }

    /// The stored value, or NULL for an unknown key.
    fn get_value(&self, args: &[Value]) -> EvalResult {
        let key = args[0].string_at(0)?;
        Ok(self.0.lock().get(&key).cloned().unwrap_or_else(Value::null))
    }

    /// Store a value; storing NULL removes the key.
    fn set_value(&self, context: &HostContext, args: &[Value]) -> EvalResult {
        let key = args[0].string_at(0)?;
        let value = &args[1];
        let mut entries = self.0.lock();
        if value.is_null() {
            entries.remove(&key);
        } else {
            entries.insert(key, value.clone());
            context.mark(HostFlag::Dictionary);
        }
        Ok(Value::invisible_null())
    }
}

/// A free-standing dictionary object.
#[derive(Debug)]
pub struct Dictionary {
    entries: Entries,
    context: Arc<HostContext>,
}

impl Dictionary {
    pub fn new(context: &Arc<HostContext>) -> Self {
        Dictionary {
            entries: Entries::default(),
            context: Arc::clone(context),
        }
    }
}

impl ScriptObject for Dictionary {
    fn class(&self) -> &'static ClassDescriptor {
        &DICTIONARY_CLASS
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn execute_instance_method(&self, method: &str, args: &[Value], ctx: &mut dyn CallContext) -> EvalResult {
        match self.entries.execute(&self.context, method, args) {
            Some(result) => result,
            None => root_instance_method(self.class(), &|p| self.get_property(p), method, ctx),
        }
    }
}
