pub mod device;
pub mod script;
pub mod sim;

#[cfg(test)]
mod test;
