use proc_macro::TokenStream;
use quote::quote;

fn get_enum_variants(
    input: &syn::DeriveInput,
) -> &syn::punctuated::Punctuated<syn::Variant, syn::token::Comma> {
    let variants = match &input.data {
        syn::Data::Enum(enum_item) => &enum_item.variants,
        _ => panic!("Input must be an enum."),
    };

    assert!(
        variants.iter().all(|v| v.fields.is_empty()),
        "All variants must have no fields."
    );

    variants
}

/// Derives `fn name(&self) -> &'static str` returning the variant's identifier.
///
/// Used for rendering opcode/register mnemonics in dumps and diagnostics
/// without hand-writing a match arm per variant.
#[proc_macro_derive(EnumName)]
pub fn enum_name_derive(input: TokenStream) -> TokenStream {
    let syn_item: syn::DeriveInput = syn::parse(input).unwrap();
    let name = &syn_item.ident;
    let variants = get_enum_variants(&syn_item);

    let identifiers = variants.iter().map(|v| &v.ident);
    let literals = variants.iter().map(|v| v.ident.to_string());

    let expanded = quote! {
        impl #name {
            pub fn name(&self) -> &'static str {
                match self {
                    #( #name::#identifiers => #literals, )*
                }
            }
        }
    };
    expanded.into()
}

/// Derives case-sensitive `EnumFromStr`/`FromStr` matching on exact variant names.
///
/// Callers that need case-insensitive mnemonics (DLX opcodes and register
/// names are case-insensitive per the assembly grammar) upper-case the
/// input before calling `from_str`.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str_derive(input: TokenStream) -> TokenStream {
    let syn_item: syn::DeriveInput = syn::parse(input).unwrap();
    let name = &syn_item.ident;
    let name_str = name.to_string();
    let variants = get_enum_variants(&syn_item);
    let literals = variants.iter().map(|v| v.ident.to_string());
    let identifiers = variants.iter().map(|v| &v.ident);

    let expanded = quote! {
        impl EnumFromStr for #name {
            fn from_str(s: &str) -> Result<#name, ::util::ParseEnumError> {
                match s {
                    #( #literals => Ok(#name::#identifiers), )*
                    _ => Err(::util::ParseEnumError {
                        value: s.to_string(),
                        enum_name: #name_str,
                    }),
                }
            }
        }
    };
    expanded.into()
}
