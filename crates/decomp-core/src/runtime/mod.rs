//! Reference executor for generated mapper bodies.
//!
//! Evaluates the statement model of a mapper's codec subsystem over dynamic
//! values, so generated serialize/deserialize pairs and mapping expressions can
//! be checked without rendering or compiling anything.

pub mod wire;


use crate::{
    mapper::{Direction, MapperDefinition},
    stmt::{Expr, LogLevel, MethodDef, RuntimeOp, RuntimeType, Stmt, TypeExpr},
};
use decomp_schema::{model::TypeModel, platform::COLLECTION, types::TypeRef};
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};
use thiserror::Error as ThisError;

///
/// RuntimeError
///

#[derive(Debug, ThisError)]
pub enum RuntimeError {
    #[error("mapper '{mapper}' has no generated method '{method}'")]
    UnknownMethod { mapper: String, method: String },

    #[error("method '{method}' expects {expected} argument(s), got {found}")]
    Arity {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("unbound variable '{0}'")]
    Unbound(String),

    #[error("method '{0}' finished without returning")]
    MissingReturn(String),

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("class is not registered: {class}")]
    Unregistered { class: String },

    #[error("cannot instantiate {class} without a fallback strategy")]
    NotInstantiable { class: String },

    #[error("cannot cast {found} to {expected}")]
    ClassCast { expected: String, found: String },

    #[error("no field '{field}' on {class}")]
    NoSuchField { class: String, field: String },

    #[error("stream already closed")]
    Closed,

    #[error("corrupt class tag '{tag}'")]
    CorruptTag { tag: String },

    #[error("codec error: {0}")]
    Codec(#[from] serde_cbor::Error),
}

///
/// Value
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Self>),
    Object(Object),
}

impl Value {
    #[must_use]
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    /// Runtime class a codec would tag this value with.
    #[must_use]
    pub fn runtime_class(&self) -> Option<&str> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some("java.lang.Boolean"),
            Self::Int(_) => Some("java.lang.Integer"),
            Self::Float(_) => Some("java.lang.Double"),
            Self::Text(_) => Some("java.lang.String"),
            Self::List(_) => Some("java.util.ArrayList"),
            Self::Object(obj) => Some(&obj.class),
        }
    }

    /// Byte sequence with each byte as a signed element.
    #[must_use]
    pub fn byte_list(bytes: &[u8]) -> Self {
        Self::List(byte_values(bytes))
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

///
/// Object
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Object {
    pub class: String,
    pub fields: BTreeMap<String, Value>,
}

impl Object {
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.fields.insert(field.to_string(), value);
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

///
/// LogEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

///
/// CodecRuntime
/// strict by default: unregistered classes are rejected
///

#[derive(Debug)]
struct CodecRuntime {
    strict: bool,
    fallback: bool,
    registered: BTreeSet<String>,
}

impl Default for CodecRuntime {
    fn default() -> Self {
        Self {
            strict: true,
            fallback: false,
            registered: BTreeSet::new(),
        }
    }
}

///
/// Stream
///

#[derive(Debug)]
struct Stream {
    bytes: Rc<RefCell<Vec<u8>>>,
    closed: bool,
}

type Shared<T> = Rc<RefCell<T>>;

///
/// Binding
/// anything a generated body can hold in a variable
///

#[derive(Clone, Debug)]
enum Binding {
    Value(Value),
    Runtime(Shared<CodecRuntime>),
    Fallback,
    OutputBuffer(Shared<Vec<u8>>),
    NativeBytes(Shared<Vec<u8>>),
    InputBuffer(Rc<Vec<u8>>),
    Writer(Shared<Stream>),
    Reader(Shared<Stream>),
    Field(String),
}

impl Binding {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Runtime(_) => "codec runtime",
            Self::Fallback => "fallback strategy",
            Self::OutputBuffer(_) => "output buffer",
            Self::NativeBytes(_) => "native bytes",
            Self::InputBuffer(_) => "input buffer",
            Self::Writer(_) => "writer",
            Self::Reader(_) => "reader",
            Self::Field(_) => "field handle",
        }
    }

    fn mismatch(&self, expected: &'static str) -> RuntimeError {
        RuntimeError::TypeMismatch {
            expected,
            found: self.kind().to_string(),
        }
    }

    fn into_value(self) -> Result<Value, RuntimeError> {
        match self {
            Self::Value(value) => Ok(value),
            other => Err(other.mismatch("value")),
        }
    }
}

type Frame = BTreeMap<String, Binding>;

///
/// Executor
///

pub struct Executor<'a> {
    model: &'a dyn TypeModel,
    log: Vec<LogEntry>,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub const fn new(model: &'a dyn TypeModel) -> Self {
        Self {
            model,
            log: Vec::new(),
        }
    }

    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Call a generated method of `mapper` with value arguments.
    pub fn call(
        &mut self,
        mapper: &MapperDefinition,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let args = args.into_iter().map(Binding::Value).collect();

        self.invoke(mapper, method, args)?.into_value()
    }

    /// Evaluate every mapping entry of one conversion method against `source`.
    pub fn apply_mappings(
        &mut self,
        mapper: &MapperDefinition,
        direction: Direction,
        source: &Value,
    ) -> Result<BTreeMap<String, Value>, RuntimeError> {
        let method = mapper.method(direction);
        let mut frame = Frame::new();
        frame.insert(method.input().to_string(), Binding::Value(source.clone()));

        let mut out = BTreeMap::new();
        for mapping in &method.mappings {
            let value = self.eval(mapper, &mut frame, &mapping.expression)?.into_value()?;
            out.insert(mapping.target.clone(), value);
        }

        Ok(out)
    }

    fn invoke(
        &mut self,
        mapper: &MapperDefinition,
        name: &str,
        args: Vec<Binding>,
    ) -> Result<Binding, RuntimeError> {
        let method: &MethodDef =
            mapper
                .generated_method(name)
                .ok_or_else(|| RuntimeError::UnknownMethod {
                    mapper: mapper.qualified_name.clone(),
                    method: name.to_string(),
                })?;

        let params = &method.signature.params;
        if params.len() != args.len() {
            return Err(RuntimeError::Arity {
                method: name.to_string(),
                expected: params.len(),
                found: args.len(),
            });
        }

        let mut frame: Frame = params
            .iter()
            .map(|p| p.name.clone())
            .zip(args)
            .collect();

        match self.exec_block(mapper, &mut frame, &method.body)? {
            Some(ret) => Ok(ret),
            None if method.signature.returns == TypeExpr::Void => Ok(Binding::Value(Value::Null)),
            None => Err(RuntimeError::MissingReturn(name.to_string())),
        }
    }

    fn exec_block(
        &mut self,
        mapper: &MapperDefinition,
        frame: &mut Frame,
        body: &[Stmt],
    ) -> Result<Option<Binding>, RuntimeError> {
        for stmt in body {
            if let Some(ret) = self.exec(mapper, frame, stmt)? {
                return Ok(Some(ret));
            }
        }

        Ok(None)
    }

    fn exec(
        &mut self,
        mapper: &MapperDefinition,
        frame: &mut Frame,
        stmt: &Stmt,
    ) -> Result<Option<Binding>, RuntimeError> {
        match stmt {
            Stmt::ReturnIfNull { var, or_empty } => {
                let empty = match lookup(frame, var)? {
                    Binding::Value(Value::Null) => true,
                    Binding::Value(Value::List(items)) => *or_empty && items.is_empty(),
                    _ => false,
                };
                if empty {
                    return Ok(Some(Binding::Value(Value::Null)));
                }
            }
            Stmt::Declare { var, init, .. } => {
                let value = self.eval(mapper, frame, init)?;
                frame.insert(var.clone(), value);
            }
            Stmt::Eval(expr) => {
                self.eval(mapper, frame, expr)?;
            }
            Stmt::CopyBytes { from, into } => {
                let bytes = bytes_of(&self.eval(mapper, frame, from)?)?;
                copy_into(frame, into, &bytes)?;
            }
            Stmt::TryCatch {
                body,
                error_var,
                handler,
            } => match self.exec_block(mapper, frame, body) {
                Ok(Some(ret)) => return Ok(Some(ret)),
                Ok(None) => {}
                Err(err) => {
                    frame.insert(error_var.clone(), Binding::Value(Value::Text(err.to_string())));
                    if let Some(ret) = self.exec_block(mapper, frame, handler)? {
                        return Ok(Some(ret));
                    }
                }
            },
            Stmt::Log { level, message } => {
                let message = match self.eval(mapper, frame, message)? {
                    Binding::Value(Value::Text(text)) => text,
                    other => format!("{other:?}"),
                };
                self.log.push(LogEntry {
                    level: *level,
                    message,
                });
            }
            Stmt::Return(expr) => return Ok(Some(self.eval(mapper, frame, expr)?)),
        }

        Ok(None)
    }

    fn eval(
        &mut self,
        mapper: &MapperDefinition,
        frame: &mut Frame,
        expr: &Expr,
    ) -> Result<Binding, RuntimeError> {
        match expr {
            Expr::Var(name) => lookup(frame, name).cloned(),
            Expr::Null => Ok(Binding::Value(Value::Null)),
            Expr::Text(text) => Ok(Binding::Value(Value::Text(text.clone()))),
            Expr::Construct { ty, args } => {
                let args = self.eval_all(mapper, frame, args)?;
                construct(*ty, &args)
            }
            Expr::Call { method, args } => {
                let args = self.eval_all(mapper, frame, args)?;
                self.invoke(mapper, method, args)
            }
            Expr::Op { target, op, args } => {
                let target = self.eval(mapper, frame, target)?;
                let args = self.eval_all(mapper, frame, args)?;
                self.apply_op(&target, op, &args)
            }
            Expr::Cast { ty, expr } => {
                let value = self.eval(mapper, frame, expr)?.into_value()?;
                self.cast(ty, value).map(Binding::Value)
            }
        }
    }

    fn eval_all(
        &mut self,
        mapper: &MapperDefinition,
        frame: &mut Frame,
        exprs: &[Expr],
    ) -> Result<Vec<Binding>, RuntimeError> {
        exprs.iter().map(|e| self.eval(mapper, frame, e)).collect()
    }

    fn apply_op(
        &self,
        target: &Binding,
        op: &RuntimeOp,
        args: &[Binding],
    ) -> Result<Binding, RuntimeError> {
        let done = Ok(Binding::Value(Value::Null));

        match (op, target) {
            (RuntimeOp::RelaxRegistration, Binding::Runtime(rt)) => {
                rt.borrow_mut().strict = false;
                done
            }
            (RuntimeOp::InstallFallbackInstantiation, Binding::Runtime(rt)) => match arg(args, 0)? {
                Binding::Fallback => {
                    rt.borrow_mut().fallback = true;
                    done
                }
                other => Err(other.mismatch("fallback strategy")),
            },
            (RuntimeOp::Register(ty), Binding::Runtime(rt)) => {
                rt.borrow_mut()
                    .registered
                    .insert(ty.qualified_name().to_string());
                done
            }
            (RuntimeOp::WriteTagged, Binding::Runtime(rt)) => {
                let Binding::Writer(writer) = arg(args, 0)? else {
                    return Err(arg(args, 0)?.mismatch("writer"));
                };
                let value = arg(args, 1)?.clone().into_value()?;
                check_registered(&rt.borrow(), &value)?;

                let writer = writer.borrow();
                if writer.closed {
                    return Err(RuntimeError::Closed);
                }
                wire::write_tagged(&mut writer.bytes.borrow_mut(), &value)?;
                done
            }
            (RuntimeOp::ReadTagged, Binding::Runtime(rt)) => {
                let Binding::Reader(reader) = arg(args, 0)? else {
                    return Err(arg(args, 0)?.mismatch("reader"));
                };
                let reader = reader.borrow();
                if reader.closed {
                    return Err(RuntimeError::Closed);
                }
                let (_, value) = wire::read_tagged(&reader.bytes.borrow())?;

                let rt = rt.borrow();
                check_registered(&rt, &value)?;
                self.check_instantiable(&rt, &value)?;

                Ok(Binding::Value(value))
            }
            (RuntimeOp::Close, Binding::Writer(stream) | Binding::Reader(stream)) => {
                stream.borrow_mut().closed = true;
                done
            }
            (RuntimeOp::ToNativeBytes, Binding::OutputBuffer(buf)) => {
                Ok(Binding::NativeBytes(Rc::new(RefCell::new(buf.borrow().clone()))))
            }
            (RuntimeOp::Len, Binding::Value(Value::List(items))) => {
                let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
                Ok(Binding::Value(Value::Int(len)))
            }
            (RuntimeOp::LookupDeclaredField, Binding::Value(source)) => {
                let Binding::Value(Value::Text(field)) = arg(args, 0)? else {
                    return Err(arg(args, 0)?.mismatch("field name"));
                };
                let obj = object_of(source)?;
                if !obj.fields.contains_key(field) {
                    return Err(RuntimeError::NoSuchField {
                        class: obj.class.clone(),
                        field: field.clone(),
                    });
                }

                Ok(Binding::Field(field.clone()))
            }
            (RuntimeOp::ForceAccessible, Binding::Field(_)) => done,
            (RuntimeOp::ReadField, Binding::Field(field)) => {
                let Binding::Value(source) = arg(args, 0)? else {
                    return Err(arg(args, 0)?.mismatch("object"));
                };
                let obj = object_of(source)?;

                obj.get(field)
                    .cloned()
                    .map(Binding::Value)
                    .ok_or_else(|| RuntimeError::NoSuchField {
                        class: obj.class.clone(),
                        field: field.clone(),
                    })
            }
            (_, other) => Err(other.mismatch("operation target")),
        }
    }

    fn cast(&self, ty: &TypeExpr, value: Value) -> Result<Value, RuntimeError> {
        let ok = match (ty, &value) {
            (_, Value::Null) | (TypeExpr::Object, _) => true,
            (TypeExpr::Text, v) => matches!(v, Value::Text(_)),
            (TypeExpr::Bytes, Value::List(items)) => items.iter().all(|i| matches!(i, Value::Int(_))),
            (TypeExpr::Named(target), v) => self.conforms(v, target),
            _ => false,
        };

        if ok {
            Ok(value)
        } else {
            Err(RuntimeError::ClassCast {
                expected: describe_type(ty),
                found: value.runtime_class().unwrap_or("null").to_string(),
            })
        }
    }

    fn conforms(&self, value: &Value, ty: &TypeRef) -> bool {
        let name = ty.qualified_name();
        if name == "java.lang.Object" {
            return true;
        }

        match value {
            Value::Null => true,
            Value::Bool(_) => matches!(name, "boolean" | "java.lang.Boolean"),
            Value::Int(_) => matches!(
                name,
                "byte"
                    | "short"
                    | "int"
                    | "long"
                    | "char"
                    | "java.lang.Byte"
                    | "java.lang.Short"
                    | "java.lang.Integer"
                    | "java.lang.Long"
                    | "java.lang.Character"
                    | "java.lang.Number"
            ),
            Value::Float(_) => matches!(
                name,
                "float" | "double" | "java.lang.Float" | "java.lang.Double" | "java.lang.Number"
            ),
            Value::Text(_) => matches!(name, "java.lang.String" | "java.lang.CharSequence"),
            Value::List(_) => ty.is_array() || self.model.is_subtype_of(ty, COLLECTION),
            Value::Object(obj) => self
                .model
                .is_subtype_of(&TypeRef::named(obj.class.as_str()), name),
        }
    }

    // objects without a no-argument constructor need the fallback strategy,
    // as do classes the model does not declare
    fn check_instantiable(&self, rt: &CodecRuntime, value: &Value) -> Result<(), RuntimeError> {
        if rt.fallback {
            return Ok(());
        }

        match value {
            Value::Object(obj) => {
                let has_default = self.model.declaration(&obj.class).is_some_and(|decl| {
                    let mut ctors = decl.methods.iter().filter(|m| m.constructor).peekable();
                    ctors.peek().is_none() || ctors.any(|m| m.params.is_empty())
                });
                if !has_default {
                    return Err(RuntimeError::NotInstantiable {
                        class: obj.class.clone(),
                    });
                }
                obj.fields
                    .values()
                    .try_for_each(|v| self.check_instantiable(rt, v))
            }
            Value::List(items) => items
                .iter()
                .try_for_each(|v| self.check_instantiable(rt, v)),
            _ => Ok(()),
        }
    }
}

fn lookup<'f>(frame: &'f Frame, name: &str) -> Result<&'f Binding, RuntimeError> {
    frame
        .get(name)
        .ok_or_else(|| RuntimeError::Unbound(name.to_string()))
}

fn arg(args: &[Binding], index: usize) -> Result<&Binding, RuntimeError> {
    args.get(index).ok_or(RuntimeError::TypeMismatch {
        expected: "argument",
        found: "nothing".to_string(),
    })
}

fn object_of(value: &Value) -> Result<&Object, RuntimeError> {
    value.as_object().ok_or_else(|| RuntimeError::TypeMismatch {
        expected: "object",
        found: value.runtime_class().unwrap_or("null").to_string(),
    })
}

fn construct(ty: RuntimeType, args: &[Binding]) -> Result<Binding, RuntimeError> {
    let binding = match ty {
        RuntimeType::CodecRuntime => Binding::Runtime(Rc::default()),
        RuntimeType::FallbackInstantiation => Binding::Fallback,
        RuntimeType::ByteOutputBuffer => Binding::OutputBuffer(Rc::default()),
        RuntimeType::ByteSequence => Binding::Value(Value::List(Vec::new())),
        RuntimeType::CodecWriter => match arg(args, 0)? {
            Binding::OutputBuffer(buf) => Binding::Writer(Rc::new(RefCell::new(Stream {
                bytes: Rc::clone(buf),
                closed: false,
            }))),
            other => return Err(other.mismatch("output buffer")),
        },
        RuntimeType::ByteInputBuffer => match arg(args, 0)? {
            Binding::NativeBytes(buf) => Binding::InputBuffer(Rc::new(buf.borrow().clone())),
            other => return Err(other.mismatch("native bytes")),
        },
        RuntimeType::CodecReader => match arg(args, 0)? {
            Binding::InputBuffer(bytes) => Binding::Reader(Rc::new(RefCell::new(Stream {
                bytes: Rc::new(RefCell::new(bytes.as_ref().clone())),
                closed: false,
            }))),
            other => return Err(other.mismatch("input buffer")),
        },
        RuntimeType::NativeBytes => match arg(args, 0)? {
            Binding::Value(Value::Int(len)) => {
                let len = usize::try_from(*len).map_err(|_| RuntimeError::TypeMismatch {
                    expected: "length",
                    found: len.to_string(),
                })?;
                Binding::NativeBytes(Rc::new(RefCell::new(vec![0; len])))
            }
            other => return Err(other.mismatch("length")),
        },
        RuntimeType::FieldHandle => {
            return Err(RuntimeError::TypeMismatch {
                expected: "constructible runtime type",
                found: ty.to_string(),
            });
        }
    };

    Ok(binding)
}

fn check_registered(rt: &CodecRuntime, value: &Value) -> Result<(), RuntimeError> {
    if !rt.strict {
        return Ok(());
    }

    match value {
        Value::Object(obj) => {
            if !rt.registered.contains(&obj.class) {
                return Err(RuntimeError::Unregistered {
                    class: obj.class.clone(),
                });
            }
            obj.fields.values().try_for_each(|v| check_registered(rt, v))
        }
        Value::List(items) => items.iter().try_for_each(|v| check_registered(rt, v)),
        _ => Ok(()),
    }
}

fn bytes_of(binding: &Binding) -> Result<Vec<u8>, RuntimeError> {
    match binding {
        Binding::NativeBytes(buf) => Ok(buf.borrow().clone()),
        Binding::Value(Value::List(items)) => items
            .iter()
            .map(|item| match item {
                Value::Int(n) => i8::try_from(*n)
                    .map(|b| b.to_ne_bytes()[0])
                    .map_err(|_| RuntimeError::TypeMismatch {
                        expected: "byte",
                        found: n.to_string(),
                    }),
                other => Err(RuntimeError::TypeMismatch {
                    expected: "byte",
                    found: format!("{other:?}"),
                }),
            })
            .collect(),
        other => Err(other.mismatch("bytes")),
    }
}

fn byte_values(bytes: &[u8]) -> Vec<Value> {
    bytes
        .iter()
        .map(|b| Value::Int(i64::from(i8::from_ne_bytes([*b]))))
        .collect()
}

fn copy_into(frame: &mut Frame, into: &str, bytes: &[u8]) -> Result<(), RuntimeError> {
    match frame.get_mut(into) {
        Some(Binding::Value(Value::List(items))) => {
            items.extend(byte_values(bytes));
            Ok(())
        }
        Some(Binding::NativeBytes(buf)) => {
            let mut buf = buf.borrow_mut();
            if buf.len() != bytes.len() {
                return Err(RuntimeError::TypeMismatch {
                    expected: "buffer of matching length",
                    found: format!("{} byte(s)", buf.len()),
                });
            }
            buf.copy_from_slice(bytes);
            Ok(())
        }
        Some(other) => Err(other.mismatch("byte target")),
        None => Err(RuntimeError::Unbound(into.to_string())),
    }
}

fn describe_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Named(ty) => ty.to_string(),
        TypeExpr::Runtime(rt) => rt.to_string(),
        other => format!("{other:?}"),
    }
}
