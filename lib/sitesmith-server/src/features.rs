pub(crate) mod sites;
