use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::ParseStream;
use syn::{
    Data, DeriveInput, Fields, GenericArgument, Ident, LitInt, LitStr, Path, PathArguments, Token,
    Type, parse_macro_input, spanned::Spanned,
};

/// Generates `rowbind::Entity::describe` from field attributes.
///
/// - `#[column("label")]` or `#[column(name = "label", get = path, set = path)]`
/// - `#[nest("alias")]` on an `Option<N>` or `Option<Box<N>>` field
/// - `#[base]` flattens an embedded entity's fields into this one
/// - `#[property(name = "...")]`, `#[property(skip)]`
/// - container `#[entity(constructor = path)]`, `#[entity(no_constructor)]`,
///   `#[entity(private)]`, `#[entity(name = "...")]`
///
/// Without a container attribute the type is built through `Default`.
#[proc_macro_derive(Entity, attributes(entity, column, nest, base, property))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_entity(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Generates `rowbind::CodedEnum` for a fieldless enum whose variants carry
/// `#[code(<i32>)]` or `#[code(<i32>, "label")]`. The label defaults to the
/// variant name.
#[proc_macro_derive(CodedEnum, attributes(code))]
pub fn derive_coded_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_coded_enum(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

enum ConstructorOption {
    Default,
    Path(Path),
    Missing,
    Private,
}

struct EntityOptions {
    constructor: ConstructorOption,
    name: Option<LitStr>,
}

#[derive(Default)]
struct ColumnOptions {
    name: Option<LitStr>,
    getter: Option<Path>,
    setter: Option<Path>,
}

#[derive(Default)]
struct PropertyOptions {
    name: Option<LitStr>,
    skip: bool,
}

enum FieldRole {
    Column(ColumnOptions),
    Nest(LitStr),
    Base,
    Property,
}

fn expand_entity(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Entity does not support generic structs",
        ));
    }

    let options = parse_entity_options(&input.attrs)?;

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields,
            _ => {
                return Err(syn::Error::new(
                    struct_name.span(),
                    "Entity requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Entity can only be derived for structs",
            ));
        }
    };

    let mut steps = Vec::<TokenStream2>::new();
    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "Entity requires named fields"))?;
        let field_name = ident.to_string().trim_start_matches("r#").to_string();
        let ty = &field.ty;
        let role = parse_field_role(&field.attrs)?;
        let property = parse_property_options(&field.attrs)?;

        let step = match role {
            FieldRole::Column(column) => {
                let binding = column
                    .name
                    .unwrap_or_else(|| LitStr::new(&field_name, ident.span()));
                if column.getter.is_none() && column.setter.is_none() {
                    quote! {
                        .column(#binding, #field_name, |this| &this.#ident, |this| &mut this.#ident)
                    }
                } else {
                    let getter = method_option(column.getter, quote!(fn(&Self) -> #ty));
                    let setter = method_option(column.setter, quote!(fn(&mut Self, #ty)));
                    quote! {
                        .column_with(#binding, #field_name, #getter, #setter)
                    }
                }
            }
            FieldRole::Nest(alias) => {
                let method = if is_option_of_box(ty) {
                    quote!(nest_boxed)
                } else if option_inner(ty).is_some() {
                    quote!(nest)
                } else {
                    return Err(syn::Error::new(
                        ty.span(),
                        "#[nest] fields must be Option<T> or Option<Box<T>>",
                    ));
                };
                quote! {
                    .#method(#alias, #field_name, |this| &this.#ident, |this| &mut this.#ident)
                }
            }
            FieldRole::Base => quote! {
                .base(|this| &this.#ident, |this| &mut this.#ident)
            },
            FieldRole::Property => quote! {
                .property(#field_name, |this| &this.#ident, |this| &mut this.#ident)
            },
        };
        steps.push(step);

        if property.skip {
            steps.push(quote!(.skip_property()));
        } else if let Some(name) = property.name {
            steps.push(quote!(.with_property_name(#name)));
        }
    }

    let constructor = match options.constructor {
        ConstructorOption::Default => quote!(.default_constructor()),
        ConstructorOption::Path(path) => quote!(.constructor(#path)),
        ConstructorOption::Private => quote!(.private_constructor()),
        ConstructorOption::Missing => quote!(),
    };
    let name = options.name.map(|name| quote!(.name(#name)));

    Ok(quote! {
        impl ::rowbind::entity::Entity for #struct_name {
            fn describe() -> ::rowbind::entity::EntityType {
                ::rowbind::entity::EntityType::builder::<Self>()
                    #name
                    #constructor
                    #(#steps)*
                    .build()
            }
        }
    })
}

fn method_option(path: Option<Path>, signature: TokenStream2) -> TokenStream2 {
    match path {
        Some(path) => quote!(::core::option::Option::Some(#path as #signature)),
        None => quote!(::core::option::Option::None::<#signature>),
    }
}

fn parse_entity_options(attrs: &[syn::Attribute]) -> syn::Result<EntityOptions> {
    let mut options = EntityOptions {
        constructor: ConstructorOption::Default,
        name: None,
    };

    for attr in attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("constructor") {
                let value = meta.value()?;
                options.constructor = ConstructorOption::Path(value.parse()?);
                return Ok(());
            }

            if meta.path.is_ident("no_constructor") {
                options.constructor = ConstructorOption::Missing;
                return Ok(());
            }

            if meta.path.is_ident("private") {
                options.constructor = ConstructorOption::Private;
                return Ok(());
            }

            if meta.path.is_ident("name") {
                let value = meta.value()?;
                options.name = Some(value.parse()?);
                return Ok(());
            }

            Err(meta.error(
                "Unsupported entity attribute. Supported: constructor = path, no_constructor, private, name = \"...\"",
            ))
        })?;
    }

    Ok(options)
}

fn parse_field_role(attrs: &[syn::Attribute]) -> syn::Result<FieldRole> {
    let mut role: Option<FieldRole> = None;

    for attr in attrs {
        let parsed = if attr.path().is_ident("column") {
            FieldRole::Column(parse_column_options(attr)?)
        } else if attr.path().is_ident("nest") {
            FieldRole::Nest(attr.parse_args::<LitStr>()?)
        } else if attr.path().is_ident("base") {
            attr.meta.require_path_only()?;
            FieldRole::Base
        } else {
            continue;
        };

        if role.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "A field takes only one of #[column], #[nest] and #[base]",
            ));
        }
        role = Some(parsed);
    }

    Ok(role.unwrap_or(FieldRole::Property))
}

fn parse_column_options(attr: &syn::Attribute) -> syn::Result<ColumnOptions> {
    let mut options = ColumnOptions::default();
    match &attr.meta {
        syn::Meta::Path(_) => {}
        syn::Meta::List(list) => {
            if let Ok(name) = syn::parse2::<LitStr>(list.tokens.clone()) {
                options.name = Some(name);
                return Ok(options);
            }

            list.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    options.name = Some(meta.value()?.parse()?);
                    return Ok(());
                }

                if meta.path.is_ident("get") {
                    options.getter = Some(meta.value()?.parse()?);
                    return Ok(());
                }

                if meta.path.is_ident("set") {
                    options.setter = Some(meta.value()?.parse()?);
                    return Ok(());
                }

                Err(meta.error(
                    "Unsupported #[column(...)] option. Supported: \"label\", name = \"...\", get = path, set = path",
                ))
            })?;
        }
        syn::Meta::NameValue(_) => {
            return Err(syn::Error::new(
                attr.span(),
                "Unsupported #[column = ...] syntax. Use #[column(\"label\")]",
            ));
        }
    }
    Ok(options)
}

fn parse_property_options(attrs: &[syn::Attribute]) -> syn::Result<PropertyOptions> {
    let mut options = PropertyOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("property") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }

            if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse()?);
                return Ok(());
            }

            Err(meta.error("Unsupported #[property(...)] option. Supported: skip, name = \"...\""))
        })?;
    }

    Ok(options)
}

fn option_inner(ty: &Type) -> Option<&Type> {
    single_generic_arg(ty, "Option")
}

fn is_option_of_box(ty: &Type) -> bool {
    option_inner(ty)
        .and_then(|inner| single_generic_arg(inner, "Box"))
        .is_some()
}

fn single_generic_arg<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() || !path_ends_with_ident(&type_path.path, wrapper) {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn path_ends_with_ident(path: &Path, ident: &str) -> bool {
    path.segments
        .last()
        .map(|segment| segment.ident == ident)
        .unwrap_or(false)
}

fn expand_coded_enum(input: DeriveInput) -> syn::Result<TokenStream2> {
    let enum_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "CodedEnum does not support generic enums",
        ));
    }

    let Data::Enum(data) = input.data else {
        return Err(syn::Error::new(
            enum_name.span(),
            "CodedEnum can only be derived for enums",
        ));
    };

    let mut variants = Vec::<Ident>::new();
    let mut codes = Vec::<i32>::new();
    let mut labels = Vec::<String>::new();

    for variant in data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "CodedEnum variants cannot carry fields",
            ));
        }

        let attr = variant
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("code"))
            .ok_or_else(|| {
                syn::Error::new(variant.span(), "CodedEnum variants need #[code(<i32>)]")
            })?;
        let (code, label) = attr.parse_args_with(parse_code_args)?;

        if codes.contains(&code) {
            return Err(syn::Error::new(
                attr.span(),
                format!("Duplicate code {code} in CodedEnum"),
            ));
        }

        labels.push(label.map(|l| l.value()).unwrap_or_else(|| variant.ident.to_string()));
        codes.push(code);
        variants.push(variant.ident);
    }

    Ok(quote! {
        impl ::rowbind::reader::CodedEnum for #enum_name {
            fn variants() -> &'static [Self] {
                &[#(Self::#variants),*]
            }

            fn code(&self) -> i32 {
                match self {
                    #(Self::#variants => #codes,)*
                }
            }

            fn label(&self) -> &'static str {
                match self {
                    #(Self::#variants => #labels,)*
                }
            }
        }
    })
}

fn parse_code_args(input: ParseStream) -> syn::Result<(i32, Option<LitStr>)> {
    let negative = input.parse::<Option<Token![-]>>()?.is_some();
    let lit: LitInt = input.parse()?;
    let magnitude = lit.base10_parse::<i64>()?;
    let value = if negative { -magnitude } else { magnitude };
    let code = i32::try_from(value)
        .map_err(|_| syn::Error::new(lit.span(), "code must fit in an i32"))?;

    let label = if input.parse::<Option<Token![,]>>()?.is_some() && !input.is_empty() {
        Some(input.parse::<LitStr>()?)
    } else {
        None
    };
    Ok((code, label))
}
