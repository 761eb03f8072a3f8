pub(crate) mod auth_service;
pub(crate) mod image_normalizer;
pub(crate) mod interaction_service;
pub(crate) mod post_service;
pub(crate) mod upload_service;

#[cfg(test)]
pub(crate) mod test_support;
