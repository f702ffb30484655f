//! Schema weaving.
//!
//! [`SchemaWeaver`] gathers resolver units and global middleware, then
//! lowers the silk descriptors they reference into the engine's dynamic
//! schema. Weaving is all-or-nothing: the first invalid descriptor aborts
//! with a [`WeaveError`] and no schema is produced.
//!
//! The application context for a request is attached as engine request
//! data: `Request::new(query).data(AppContext::new(...))`.

mod input;

use std::sync::Arc;

use async_graphql::{
    dynamic::{
        Enum, Field as DynamicField, FieldFuture, FieldValue, InputObject, InputValue, Interface,
        InterfaceField, Object, Scalar, Schema, Subscription, SubscriptionField,
        SubscriptionFieldFuture, TypeRef, Union,
    },
    Error, Name, QueryPathNode, QueryPathSegment, Value,
};
use futures_util::{future::BoxFuture, StreamExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{ResolveError, WeaveError},
    resolver::{
        middleware::{Middleware, MiddlewareChain, Next, ResolveResult},
        payload::{with_payload, AppContext, ResolveInfo, ResolverPayload},
        ErrorHook, Field, InputSpec, OperationKind, ResolveFn, ResolveRequest, Resolver,
    },
    silk::{MetaField, MetaType},
    utils::deep_merge,
};

use self::input::InputMap;

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

/// Names of the root operation types.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeaverConfig {
    pub query_type_name: String,
    pub mutation_type_name: String,
    pub subscription_type_name: String,
}

impl Default for WeaverConfig {
    fn default() -> Self {
        Self {
            query_type_name: "Query".to_string(),
            mutation_type_name: "Mutation".to_string(),
            subscription_type_name: "Subscription".to_string(),
        }
    }
}

/// Collects resolver units and weaves them into an executable schema.
#[derive(Default)]
pub struct SchemaWeaver {
    resolvers: Vec<Resolver>,
    middlewares: MiddlewareChain,
    config: WeaverConfig,
}

impl SchemaWeaver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(mut self, config: WeaverConfig) -> Self {
        self.config = config;
        self
    }

    /// Overlays a JSON patch onto the current config. Nested objects merge
    /// key by key, arrays concatenate.
    pub fn merge_config(mut self, patch: serde_json::Value) -> Result<Self, WeaveError> {
        let mut current = serde_json::to_value(&self.config)?;
        deep_merge(&mut current, patch);
        self.config = serde_json::from_value(current)?;
        Ok(self)
    }

    /// Registers a middleware wrapping every resolver-backed field of the
    /// woven schema, outermost in the final chain.
    #[must_use]
    pub fn use_middleware(mut self, middleware: impl Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    #[must_use]
    pub fn add_resolver(mut self, resolver: Resolver) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Weaves the collected units into a schema, consuming the weaver.
    pub fn weave(self) -> Result<Schema, WeaveError> {
        Weave::new(self)?.run()
    }
}

impl std::fmt::Debug for SchemaWeaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaWeaver")
            .field("resolvers", &self.resolvers.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A field headed into the schema: its descriptor plus the fully composed
/// middleware chain and the argument types lowered for the engine.
struct WovenField {
    name: String,
    field: Arc<Field>,
    resolve: Option<ResolveFn>,
    chain: MiddlewareChain,
    on_error: Option<ErrorHook>,
    args: Option<IndexMap<String, MetaType>>,
}

struct Weave {
    config: WeaverConfig,
    queries: Vec<WovenField>,
    mutations: Vec<WovenField>,
    subscriptions: Vec<WovenField>,
    type_fields: IndexMap<String, Vec<WovenField>>,
    registry: TypeRegistry,
    inputs_map: InputMap,
}

impl Weave {
    fn new(weaver: SchemaWeaver) -> Result<Self, WeaveError> {
        let SchemaWeaver {
            resolvers,
            middlewares: global,
            config,
        } = weaver;

        let mut queries = Vec::new();
        let mut mutations = Vec::new();
        let mut subscriptions = Vec::new();
        let mut type_fields: IndexMap<String, Vec<WovenField>> = IndexMap::new();

        for resolver in &resolvers {
            let parent_name = match resolver.parent() {
                Some(parent) => match parent.ty().named_type() {
                    MetaType::Object(object) => Some(object.name.clone()),
                    MetaType::Interface(interface) => Some(interface.name.clone()),
                    other => return Err(WeaveError::InvalidParent(other.kind().to_string())),
                },
                None => None,
            };
            for (name, field) in &resolver.fields {
                let mut chain = global.clone();
                chain.append(&resolver.middlewares);
                chain.append(&field.middlewares);
                let woven = WovenField {
                    name: name.clone(),
                    field: Arc::clone(field),
                    resolve: field.resolve.clone(),
                    chain,
                    on_error: resolver.on_error.clone(),
                    args: None,
                };
                match field.operation {
                    OperationKind::Query => {
                        push_unique(&mut queries, &config.query_type_name, woven)?;
                    }
                    OperationKind::Mutation => {
                        push_unique(&mut mutations, &config.mutation_type_name, woven)?;
                    }
                    OperationKind::Subscription => {
                        if field.subscribe.is_none() {
                            return Err(WeaveError::MissingSubscribe(name.clone()));
                        }
                        push_unique(&mut subscriptions, &config.subscription_type_name, woven)?;
                    }
                    OperationKind::Field => {
                        let parent = parent_name
                            .clone()
                            .ok_or_else(|| WeaveError::OrphanField(name.clone()))?;
                        let bucket = type_fields.entry(parent.clone()).or_default();
                        push_unique(bucket, &parent, woven)?;
                    }
                }
            }
        }

        Ok(Self {
            config,
            queries,
            mutations,
            subscriptions,
            type_fields,
            registry: TypeRegistry::default(),
            inputs_map: InputMap::default(),
        })
    }

    /// Lowers every field's declared input into engine argument types.
    fn prepare(&mut self) -> Result<(), WeaveError> {
        for woven in self
            .queries
            .iter_mut()
            .chain(self.mutations.iter_mut())
            .chain(self.subscriptions.iter_mut())
        {
            woven.args = self.inputs_map.input_to_args(woven.field.input())?;
        }
        for fields in self.type_fields.values_mut() {
            for woven in fields {
                woven.args = self.inputs_map.input_to_args(woven.field.input())?;
            }
        }
        Ok(())
    }

    fn collect_types(&mut self) -> Result<(), WeaveError> {
        for woven in self
            .queries
            .iter()
            .chain(self.mutations.iter())
            .chain(self.subscriptions.iter())
            .chain(self.type_fields.values().flatten())
        {
            self.registry.collect_output(woven.field.output().ty())?;
            if let Some(parent) = woven.field.parent() {
                self.registry.collect_output(parent.ty())?;
            }
            if let Some(args) = &woven.args {
                for ty in args.values() {
                    self.registry.collect_input(ty)?;
                }
            }
        }
        Ok(())
    }

    fn run(mut self) -> Result<Schema, WeaveError> {
        self.prepare()?;
        self.collect_types()?;
        tracing::debug!(
            queries = self.queries.len(),
            mutations = self.mutations.len(),
            subscriptions = self.subscriptions.len(),
            types = self.registry.types.len(),
            "assembling schema"
        );

        let mutation_name =
            (!self.mutations.is_empty()).then(|| self.config.mutation_type_name.clone());
        let subscription_name =
            (!self.subscriptions.is_empty()).then(|| self.config.subscription_type_name.clone());
        let mut builder = Schema::build(
            &self.config.query_type_name,
            mutation_name.as_deref(),
            subscription_name.as_deref(),
        );

        let mut query_root = Object::new(self.config.query_type_name.clone());
        for woven in &self.queries {
            query_root = query_root.field(lower_resolver_field(woven, &self.config.query_type_name)?);
        }
        builder = builder.register(query_root);

        if !self.mutations.is_empty() {
            let mut mutation_root = Object::new(self.config.mutation_type_name.clone());
            for woven in &self.mutations {
                mutation_root =
                    mutation_root.field(lower_resolver_field(woven, &self.config.mutation_type_name)?);
            }
            builder = builder.register(mutation_root);
        }

        if !self.subscriptions.is_empty() {
            let mut subscription_root =
                Subscription::new(self.config.subscription_type_name.clone());
            for woven in &self.subscriptions {
                subscription_root = subscription_root.field(lower_subscription_field(
                    woven,
                    &self.config.subscription_type_name,
                )?);
            }
            builder = builder.register(subscription_root);
        }

        for (name, named) in &self.registry.types {
            builder = match named {
                MetaType::Object(object) => {
                    let mut dynamic = Object::new(name.clone());
                    for interface in &object.interfaces {
                        dynamic = dynamic.implement(interface.clone());
                    }
                    let resolver_fields = self.type_fields.get(name.as_str());
                    for (field_name, meta) in &object.fields {
                        let overridden = resolver_fields
                            .is_some_and(|fields| fields.iter().any(|woven| &woven.name == field_name));
                        if overridden {
                            continue;
                        }
                        dynamic = dynamic.field(lower_data_field(field_name, meta));
                    }
                    if let Some(fields) = resolver_fields {
                        for woven in fields {
                            dynamic = dynamic.field(lower_resolver_field(woven, name)?);
                        }
                    }
                    builder.register(dynamic)
                }
                MetaType::Interface(interface) => {
                    let mut dynamic = Interface::new(name.clone());
                    for (field_name, meta) in &interface.fields {
                        let mut declared =
                            InterfaceField::new(field_name.clone(), type_ref(&meta.ty));
                        if let Some(description) = &meta.description {
                            declared = declared.description(description.clone());
                        }
                        dynamic = dynamic.field(declared);
                    }
                    // Fields declared through a resolver bound to the
                    // interface become part of its contract; resolution
                    // stays with the implementing objects.
                    if let Some(fields) = self.type_fields.get(name.as_str()) {
                        for woven in fields {
                            let mut declared = InterfaceField::new(
                                woven.name.clone(),
                                type_ref(woven.field.output().ty()),
                            );
                            if let Some(args) = &woven.args {
                                for (arg, ty) in args {
                                    declared =
                                        declared.argument(InputValue::new(arg.clone(), type_ref(ty)));
                                }
                            }
                            if let Some(description) = &woven.field.description {
                                declared = declared.description(description.clone());
                            }
                            dynamic = dynamic.field(declared);
                        }
                    }
                    builder.register(dynamic)
                }
                MetaType::Union(union) => {
                    let mut dynamic = Union::new(name.clone());
                    for possible in &union.possible_types {
                        dynamic = dynamic.possible_type(possible.clone());
                    }
                    builder.register(dynamic)
                }
                MetaType::Enum(r#enum) => {
                    let mut dynamic = Enum::new(name.clone());
                    for value in &r#enum.values {
                        dynamic = dynamic.item(value.clone());
                    }
                    builder.register(dynamic)
                }
                MetaType::Scalar(scalar) => builder.register(Scalar::new(scalar.name.clone())),
                MetaType::InputObject(_) | MetaType::List(_) | MetaType::NonNull(_) => builder,
            };
        }

        for (name, named) in &self.registry.inputs {
            if let MetaType::InputObject(input) = named {
                let mut dynamic = InputObject::new(name.clone());
                for (field_name, meta) in &input.fields {
                    dynamic = dynamic.field(InputValue::new(field_name.clone(), type_ref(&meta.ty)));
                }
                builder = builder.register(dynamic);
            }
        }

        builder
            .finish()
            .map_err(|err| WeaveError::Build(err.to_string()))
    }
}

/// Named types reachable from the registered resolvers. Output-position
/// types and input objects live in separate namespaces; the engine rejects
/// a name claimed by both at build time.
#[derive(Default)]
struct TypeRegistry {
    types: IndexMap<String, MetaType>,
    inputs: IndexMap<String, MetaType>,
}

impl TypeRegistry {
    /// Registers a named type, returning whether it was newly inserted.
    /// Re-registering the same definition is a no-op; a different
    /// definition under the same name aborts the weave.
    fn register(&mut self, named: &MetaType) -> Result<bool, WeaveError> {
        let name = named.name().unwrap_or_default().to_string();
        if let Some(existing) = self.types.get(&name) {
            if existing.definition_eq(named) {
                return Ok(false);
            }
            return Err(WeaveError::TypeConflict(name));
        }
        self.types.insert(name, named.clone());
        Ok(true)
    }

    fn collect_output(&mut self, ty: &MetaType) -> Result<(), WeaveError> {
        let named = ty.named_type().clone();
        match &named {
            MetaType::Scalar(scalar) => {
                if !BUILTIN_SCALARS.contains(&scalar.name.as_str()) {
                    self.register(&named)?;
                }
                Ok(())
            }
            MetaType::Object(object) => {
                if self.register(&named)? {
                    for field in object.fields.values() {
                        self.collect_output(&field.ty)?;
                    }
                }
                Ok(())
            }
            MetaType::Interface(interface) => {
                if self.register(&named)? {
                    for field in interface.fields.values() {
                        self.collect_output(&field.ty)?;
                    }
                }
                Ok(())
            }
            MetaType::Union(_) | MetaType::Enum(_) => {
                self.register(&named)?;
                Ok(())
            }
            MetaType::InputObject(_) => self.collect_input(&named),
            // named_type() never yields a wrapper
            MetaType::List(_) | MetaType::NonNull(_) => Ok(()),
        }
    }

    fn collect_input(&mut self, ty: &MetaType) -> Result<(), WeaveError> {
        let named = ty.named_type().clone();
        match &named {
            MetaType::Scalar(scalar) => {
                if !BUILTIN_SCALARS.contains(&scalar.name.as_str()) {
                    self.register(&named)?;
                }
                Ok(())
            }
            MetaType::Enum(_) => {
                self.register(&named)?;
                Ok(())
            }
            MetaType::InputObject(input) => {
                if let Some(existing) = self.inputs.get(&input.name) {
                    if existing.definition_eq(&named) {
                        return Ok(());
                    }
                    return Err(WeaveError::TypeConflict(input.name.clone()));
                }
                self.inputs.insert(input.name.clone(), named.clone());
                for field in input.fields.values() {
                    self.collect_input(&field.ty)?;
                }
                Ok(())
            }
            MetaType::Object(object) => Err(WeaveError::InvalidInput(object.name.clone())),
            MetaType::Interface(interface) => Err(WeaveError::AbstractInput {
                kind: "interface",
                name: interface.name.clone(),
            }),
            MetaType::Union(union) => Err(WeaveError::AbstractInput {
                kind: "union",
                name: union.name.clone(),
            }),
            MetaType::List(_) | MetaType::NonNull(_) => Ok(()),
        }
    }
}

fn push_unique(
    list: &mut Vec<WovenField>,
    parent: &str,
    woven: WovenField,
) -> Result<(), WeaveError> {
    if list.iter().any(|existing| existing.name == woven.name) {
        return Err(WeaveError::DuplicateField {
            parent: parent.to_string(),
            field: woven.name,
        });
    }
    list.push(woven);
    Ok(())
}

fn type_ref(ty: &MetaType) -> TypeRef {
    match ty {
        MetaType::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
        MetaType::NonNull(inner) => TypeRef::NonNull(Box::new(type_ref(inner))),
        named => TypeRef::Named(named.name().unwrap_or_default().to_string().into()),
    }
}

fn render_type(ty: &MetaType) -> String {
    match ty {
        MetaType::List(inner) => format!("[{}]", render_type(inner)),
        MetaType::NonNull(inner) => format!("{}!", render_type(inner)),
        named => named.name().unwrap_or_default().to_string(),
    }
}

fn query_path(node: Option<&QueryPathNode<'_>>) -> Vec<String> {
    fn collect(node: Option<&QueryPathNode<'_>>, out: &mut Vec<String>) {
        if let Some(node) = node {
            collect(node.parent, out);
            match node.segment {
                QueryPathSegment::Index(index) => out.push(index.to_string()),
                QueryPathSegment::Name(name) => out.push(name.to_string()),
            }
        }
    }
    let mut segments = Vec::new();
    collect(node, &mut segments);
    segments
}

/// Runs each raw argument through its silk before the resolve function
/// sees it.
fn decode_args(field: &Field, raw: IndexMap<Name, Value>) -> Result<IndexMap<Name, Value>, ResolveError> {
    match &field.input {
        InputSpec::None => Ok(raw),
        InputSpec::Record(silks) => {
            let mut decoded = raw;
            for (name, silk) in silks {
                let value = decoded.get(name.as_str()).cloned().unwrap_or(Value::Null);
                let value = silk.decode(value).map_err(|reason| ResolveError::InvalidArgument {
                    name: name.clone(),
                    reason,
                })?;
                decoded.insert(Name::new(name), value);
            }
            Ok(decoded)
        }
        InputSpec::Object(silk) => {
            let whole = Value::Object(raw);
            match silk.decode(whole).map_err(ResolveError::InvalidInput)? {
                Value::Object(map) => Ok(map),
                _ => Err(ResolveError::InvalidInput("expected an object".to_string())),
            }
        }
    }
}

fn apply_error_hook(outcome: ResolveResult, hook: Option<&ErrorHook>) -> ResolveResult {
    match (outcome, hook) {
        (Err(err), Some(hook)) => Err(hook(err)),
        (outcome, _) => outcome,
    }
}

/// For abstract outputs the concrete type is read from the resolved
/// value's `__typename` entry.
fn into_field_value(value: Value, output_is_abstract: bool) -> Option<FieldValue<'static>> {
    if value == Value::Null {
        return None;
    }
    if output_is_abstract {
        if let Value::Object(map) = &value {
            if let Some(Value::String(type_name)) = map.get("__typename") {
                let type_name = type_name.clone();
                return Some(FieldValue::value(value).with_type(type_name));
            }
        }
    }
    Some(FieldValue::value(value))
}

/// A plain data field: reads its key off the parent object value.
fn lower_data_field(name: &str, meta: &MetaField) -> DynamicField {
    let key = name.to_string();
    let output_is_abstract = meta.ty.named_type().is_abstract();
    let mut dynamic = DynamicField::new(name.to_string(), type_ref(&meta.ty), move |ctx| {
        let key = key.clone();
        FieldFuture::new(async move {
            let value = match ctx.parent_value.as_value() {
                Some(Value::Object(map)) => map.get(key.as_str()).cloned(),
                _ => None,
            };
            Ok(value.and_then(|value| into_field_value(value, output_is_abstract)))
        })
    });
    if let Some(description) = &meta.description {
        dynamic = dynamic.description(description.clone());
    }
    dynamic
}

fn lower_resolver_field(woven: &WovenField, parent_type: &str) -> Result<DynamicField, WeaveError> {
    let field = Arc::clone(&woven.field);
    let resolve = woven.resolve.clone().ok_or_else(|| WeaveError::MissingResolve {
        parent: parent_type.to_string(),
        field: woven.name.clone(),
    })?;
    let chain = woven.chain.clone();
    let on_error = woven.on_error.clone();
    let field_name = woven.name.clone();
    let parent_type = parent_type.to_string();
    let return_type = render_type(field.output().ty());
    let output_is_abstract = field.output().ty().named_type().is_abstract();
    let abstract_silk = if output_is_abstract {
        Some(field.output().clone())
    } else {
        field
            .parent()
            .filter(|parent| parent.ty().named_type().is_abstract())
            .cloned()
    };

    let mut dynamic = DynamicField::new(
        woven.name.clone(),
        type_ref(field.output().ty()),
        move |ctx| {
            let field = Arc::clone(&field);
            let resolve = Arc::clone(&resolve);
            let chain = chain.clone();
            let on_error = on_error.clone();
            let field_name = field_name.clone();
            let parent_type = parent_type.clone();
            let return_type = return_type.clone();
            let abstract_silk = abstract_silk.clone();
            FieldFuture::new(async move {
                let raw = ctx.args.as_index_map().clone();
                let parent = ctx.parent_value.as_value().cloned().unwrap_or(Value::Null);
                let context = ctx.data_opt::<AppContext>().cloned();
                let path = query_path(ctx.path_node.as_ref());

                let outcome = match decode_args(&field, raw) {
                    Ok(args) => {
                        let payload = ResolverPayload {
                            context,
                            root: parent.clone(),
                            args: args.clone(),
                            field: Arc::clone(&field),
                            info: ResolveInfo {
                                field_name,
                                parent_type,
                                return_type,
                                path,
                            },
                            is_abstract_type: abstract_silk,
                        };
                        let request = ResolveRequest { parent, args };
                        let base = Next::new(move || resolve(request.clone()));
                        with_payload(payload, chain.compose(base).run()).await
                    }
                    Err(err) => Err(err),
                };

                match apply_error_hook(outcome, on_error.as_ref()) {
                    Ok(value) => {
                        let encoded = field.output().encode(value).map_err(Error::new)?;
                        Ok(into_field_value(encoded, output_is_abstract))
                    }
                    Err(err) => Err(Error::new(err.to_string())),
                }
            })
        },
    );

    if let Some(args) = &woven.args {
        for (name, ty) in args {
            dynamic = dynamic.argument(InputValue::new(name.clone(), type_ref(ty)));
        }
    }
    if let Some(description) = &woven.field.description {
        dynamic = dynamic.description(description.clone());
    }
    Ok(dynamic)
}

/// Each value the source stream emits is run through the field's
/// middleware chain and resolve function before reaching the client.
fn lower_subscription_field(
    woven: &WovenField,
    parent_type: &str,
) -> Result<SubscriptionField, WeaveError> {
    let field = Arc::clone(&woven.field);
    let subscribe = field
        .subscribe
        .clone()
        .ok_or_else(|| WeaveError::MissingSubscribe(woven.name.clone()))?;
    let resolve = woven.resolve.clone();
    let chain = woven.chain.clone();
    let on_error = woven.on_error.clone();
    let field_name = woven.name.clone();
    let parent_type = parent_type.to_string();
    let return_type = render_type(field.output().ty());
    let output_is_abstract = field.output().ty().named_type().is_abstract();
    let abstract_silk = output_is_abstract.then(|| field.output().clone());

    let mut dynamic = SubscriptionField::new(
        woven.name.clone(),
        type_ref(field.output().ty()),
        move |ctx| {
            let field = Arc::clone(&field);
            let subscribe = Arc::clone(&subscribe);
            let resolve = resolve.clone();
            let chain = chain.clone();
            let on_error = on_error.clone();
            let field_name = field_name.clone();
            let parent_type = parent_type.clone();
            let return_type = return_type.clone();
            let abstract_silk = abstract_silk.clone();
            SubscriptionFieldFuture::new(async move {
                let raw = ctx.args.as_index_map().clone();
                let context = ctx.data_opt::<AppContext>().cloned();
                let path = query_path(ctx.path_node.as_ref());
                let args = decode_args(&field, raw).map_err(|err| Error::new(err.to_string()))?;

                let request = ResolveRequest {
                    parent: Value::Null,
                    args: args.clone(),
                };
                let setup_payload = ResolverPayload {
                    context: context.clone(),
                    root: Value::Null,
                    args: args.clone(),
                    field: Arc::clone(&field),
                    info: ResolveInfo {
                        field_name: field_name.clone(),
                        parent_type: parent_type.clone(),
                        return_type: return_type.clone(),
                        path: path.clone(),
                    },
                    is_abstract_type: abstract_silk.clone(),
                };
                let source = with_payload(setup_payload, subscribe(request))
                    .await
                    .map_err(|err| Error::new(err.to_string()))?;

                let stream = source.then(move |item| {
                    let field = Arc::clone(&field);
                    let resolve = resolve.clone();
                    let chain = chain.clone();
                    let on_error = on_error.clone();
                    let context = context.clone();
                    let args = args.clone();
                    let field_name = field_name.clone();
                    let parent_type = parent_type.clone();
                    let return_type = return_type.clone();
                    let path = path.clone();
                    let abstract_silk = abstract_silk.clone();
                    async move {
                        let outcome = match item {
                            Ok(emitted) => {
                                let payload = ResolverPayload {
                                    context,
                                    root: emitted.clone(),
                                    args: args.clone(),
                                    field: Arc::clone(&field),
                                    info: ResolveInfo {
                                        field_name,
                                        parent_type,
                                        return_type,
                                        path,
                                    },
                                    is_abstract_type: abstract_silk,
                                };
                                let base = match &resolve {
                                    Some(resolve) => {
                                        let resolve = Arc::clone(resolve);
                                        let request = ResolveRequest {
                                            parent: emitted,
                                            args,
                                        };
                                        Next::new(move || resolve(request.clone()))
                                    }
                                    None => Next::new(move || -> BoxFuture<'static, ResolveResult> {
                                        let emitted = emitted.clone();
                                        Box::pin(async move { Ok(emitted) })
                                    }),
                                };
                                with_payload(payload, chain.compose(base).run()).await
                            }
                            Err(err) => Err(err),
                        };

                        match apply_error_hook(outcome, on_error.as_ref()) {
                            Ok(value) => {
                                let encoded = field.output().encode(value).map_err(Error::new)?;
                                Ok(into_field_value(encoded, output_is_abstract)
                                    .unwrap_or_else(|| FieldValue::value(Value::Null)))
                            }
                            Err(err) => Err(Error::new(err.to_string())),
                        }
                    }
                });
                Ok(stream)
            })
        },
    );

    if let Some(args) = &woven.args {
        for (name, ty) in args {
            dynamic = dynamic.argument(InputValue::new(name.clone(), type_ref(ty)));
        }
    }
    if let Some(description) = &woven.field.description {
        dynamic = dynamic.description(description.clone());
    }
    Ok(dynamic)
}
