//! Attribute macros for declaring operations
//!
//! `#[operation]` implements `sand_rocket_operations::Operation` for a struct,
//! reading the verb/noun/description from its arguments and the parameter
//! list from the struct's named fields. Fields may carry
//! `#[param(alias = "...")]`, which `#[operation]` consumes and removes.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, Attribute, DeriveInput, Expr, Field, Ident, Lit, Meta, Token, Type,
};

/// Implement `Operation` for a struct
///
/// ```ignore
/// #[operation(verb = "move", noun = "task", description = "Move a task")]
/// #[derive(Debug, Deserialize, Serialize)]
/// pub struct MoveTask {
///     /// The task to move
///     pub id: TaskId,
///     /// Target position within the status column
///     #[param(alias = "index")]
///     pub position: Option<u32>,
/// }
/// ```
#[proc_macro_attribute]
pub fn operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as OperationArgs);
    let mut input = parse_macro_input!(item as DeriveInput);

    let params = match struct_fields(&input) {
        Ok(fields) => fields.into_iter().map(param_meta).collect::<Vec<_>>(),
        Err(err) => return err.to_compile_error().into(),
    };
    strip_param_attrs(&mut input);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let OperationArgs {
        verb,
        noun,
        description,
    } = args;
    let count = params.len();

    let expanded = quote! {
        #input

        impl #impl_generics sand_rocket_operations::Operation for #name #ty_generics #where_clause {
            fn verb(&self) -> &'static str {
                #verb
            }

            fn noun(&self) -> &'static str {
                #noun
            }

            fn description(&self) -> &'static str {
                #description
            }

            fn parameters(&self) -> &'static [sand_rocket_operations::ParamMeta] {
                <Self as sand_rocket_operations::Operation>::info().parameters
            }

            fn info() -> sand_rocket_operations::OperationInfo {
                static PARAMS: [sand_rocket_operations::ParamMeta; #count] = [
                    #(#params),*
                ];
                sand_rocket_operations::OperationInfo {
                    verb: #verb,
                    noun: #noun,
                    description: #description,
                    parameters: &PARAMS,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

struct OperationArgs {
    verb: String,
    noun: String,
    description: String,
}

impl Parse for OperationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut verb = None;
        let mut noun = None;
        let mut description = None;

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let value = match input.parse::<Lit>()? {
                Lit::Str(s) => s.value(),
                other => return Err(syn::Error::new_spanned(other, "expected string literal")),
            };

            let slot = match key.to_string().as_str() {
                "verb" => &mut verb,
                "noun" => &mut noun,
                "description" => &mut description,
                other => {
                    return Err(syn::Error::new_spanned(
                        &key,
                        format!("unknown operation argument: {}", other),
                    ))
                }
            };
            *slot = Some(value);

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(OperationArgs {
            verb: verb.ok_or_else(|| input.error("missing 'verb'"))?,
            noun: noun.ok_or_else(|| input.error("missing 'noun'"))?,
            description: description.ok_or_else(|| input.error("missing 'description'"))?,
        })
    }
}

fn struct_fields(input: &DeriveInput) -> syn::Result<Vec<&Field>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => Ok(fields.named.iter().collect()),
            syn::Fields::Unit => Ok(Vec::new()),
            syn::Fields::Unnamed(_) => Err(syn::Error::new_spanned(
                &input.ident,
                "operation does not support tuple structs",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "operation only supports structs",
        )),
    }
}

/// `#[param]` cannot stay on fields once the struct is re-emitted
fn strip_param_attrs(input: &mut DeriveInput) {
    if let syn::Data::Struct(data) = &mut input.data {
        for field in data.fields.iter_mut() {
            field.attrs.retain(|attr| !attr.path().is_ident("param"));
        }
    }
}

fn param_meta(field: &Field) -> proc_macro2::TokenStream {
    let name = field
        .ident
        .as_ref()
        .map(|ident| ident.to_string())
        .unwrap_or_default();
    let description = doc_comment(&field.attrs);
    let param_type = param_type(&field.ty);
    let aliases = param_aliases(&field.attrs);
    let required = if option_inner(&field.ty).is_some() {
        quote! {}
    } else {
        quote! { .required() }
    };

    quote! {
        sand_rocket_operations::ParamMeta::new(#name)
            .description(#description)
            .param_type(#param_type)
            #required
            .aliases(&[#(#aliases),*])
    }
}

fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the `T` of an `Option<T>`
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn param_type(ty: &Type) -> proc_macro2::TokenStream {
    if let Some(inner) = option_inner(ty) {
        return param_type(inner);
    }

    let ident = match ty {
        Type::Path(path) => path.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    };

    match ident.as_deref() {
        Some("Vec") => quote! { sand_rocket_operations::ParamType::Array },
        Some("bool") => quote! { sand_rocket_operations::ParamType::Boolean },
        Some("i32" | "i64" | "u32" | "u64" | "usize" | "isize") => {
            quote! { sand_rocket_operations::ParamType::Integer }
        }
        Some("f32" | "f64") => quote! { sand_rocket_operations::ParamType::Number },
        // ids, enums and strings all travel as JSON strings
        _ => quote! { sand_rocket_operations::ParamType::String },
    }
}

fn param_aliases(attrs: &[Attribute]) -> Vec<String> {
    let mut aliases = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("param")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("alias") {
                let value: syn::LitStr = meta.value()?.parse()?;
                aliases.push(value.value());
            }
            Ok(())
        });
    }
    aliases
}
